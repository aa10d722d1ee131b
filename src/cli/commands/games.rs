//! Games command - List the games of a battery

use anyhow::{Context, Result};
use clap::Parser;

use super::BatterySource;
use crate::cli::output::{payoff_layout, print_kv, print_section};

#[derive(Parser, Debug)]
#[command(about = "List the games of a battery with their payoff layout")]
pub struct GamesArgs {
    #[command(flatten)]
    pub source: BatterySource,

    /// Print the battery as JSON instead
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: GamesArgs) -> Result<()> {
    let battery = args.source.load("exp1")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&battery)?);
        return Ok(());
    }

    print_section(&format!(
        "Battery: {} ({} games)",
        args.source.describe("exp1"),
        battery.len()
    ));
    for named in battery.iter() {
        let game = named
            .build()
            .with_context(|| format!("Invalid game '{}'", named.name))?;
        print_kv(&named.name, &payoff_layout(&game));
    }
    Ok(())
}
