//! levelk CLI - Level-K social preference models for sharing games
//!
//! Subcommands:
//! - List the games of a battery
//! - Solve games for level-K policies under a chosen preference
//! - Fit model parameters to human choice frequencies
//! - Predict held-out games and evaluate against human data

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use env_logger::Env;

use levelk::cli::commands::{fit, games, predict, solve};

#[derive(Parser)]
#[command(name = "levelk")]
#[command(version, about = "Level-K social preference models for sharing games", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the games of a battery
    Games(games::GamesArgs),

    /// Compute level-K policies
    Solve(solve::SolveArgs),

    /// Fit model parameters to human data
    Fit(fit::FitArgs),

    /// Predict choices with fitted parameters
    Predict(predict::PredictArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Games(args) => games::execute(args),
        Commands::Solve(args) => solve::execute(args),
        Commands::Fit(args) => fit::execute(args),
        Commands::Predict(args) => predict::execute(args),
    }
}
