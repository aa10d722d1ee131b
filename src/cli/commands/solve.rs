//! Solve command - Print level-K policies for a game

use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use super::BatterySource;
use crate::{
    cli::output::{payoff_layout, print_kv, print_section, print_subsection},
    config::{DEFAULT_LEVEL, SolverConfig},
    fitting::ModelKind,
    game::{Game, Player},
    solver::{DEFAULT_MAX_PLY, LevelKSolver},
};

#[derive(Parser, Debug)]
#[command(about = "Compute level-K policies for both players")]
pub struct SolveArgs {
    #[command(flatten)]
    pub source: BatterySource,

    /// Only solve these games (default: every game in the battery)
    #[arg(long, short = 'g')]
    pub game: Vec<String>,

    /// Social preference model (selfish, inequality, reciprocity)
    #[arg(long, short = 'm', default_value = "selfish")]
    pub model: ModelKind,

    /// Parameter override as name=value (e.g. beta_player1=2.0); unset
    /// parameters take the model's initial guess
    #[arg(long = "param", short = 'p', value_parser = parse_assignment)]
    pub params: Vec<(String, f64)>,

    /// Reasoning level of both players
    #[arg(long, short = 'k', default_value_t = DEFAULT_LEVEL)]
    pub level: usize,

    /// Recursion bound in moves
    #[arg(long, default_value_t = DEFAULT_MAX_PLY)]
    pub max_ply: usize,

    /// Emit policies as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parse `name=value`.
pub fn parse_assignment(raw: &str) -> Result<(String, f64)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got '{raw}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("invalid number in '{raw}'"))?;
    Ok((name.trim().to_string(), value))
}

pub fn execute(args: SolveArgs) -> Result<()> {
    let battery = args.source.load("exp1")?;
    let config = SolverConfig::default()
        .with_level(args.level)
        .with_max_ply(args.max_ply);

    let space = args.model.space();
    let named: BTreeMap<String, f64> = args.params.iter().cloned().collect();
    let x = args.model.vector_from(&named, Some(space.initial.as_slice()))?;
    let model = args.model.instantiate(&x)?;

    let games: Vec<Game> = if args.game.is_empty() {
        battery.build()?
    } else {
        args.game
            .iter()
            .map(|name| {
                battery
                    .get(name)
                    .ok_or_else(|| anyhow!("Game '{name}' is not in the battery"))
                    .and_then(|named| Ok(named.build()?))
            })
            .collect::<Result<_>>()?
    };

    let mut exports = Vec::with_capacity(games.len());
    for game in &games {
        let mut solver = LevelKSolver::new(game, model.preference.as_ref(), model.betas)?
            .with_max_ply(config.max_ply);
        exports.push(solver.profile(config.level).export(game));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&exports)?);
        return Ok(());
    }

    print_section(&format!("Level-{} policies ({})", config.level, args.model));
    for (name, value) in space.named(&x) {
        print_kv(&name, &format!("{value:.4}"));
    }

    for (game, export) in games.iter().zip(&exports) {
        print_subsection(&format!("{}: {}", game.name(), payoff_layout(game)));
        for player in Player::BOTH {
            let Some(table) = export.policies.get(&player) else {
                continue;
            };
            for (state, actions) in table {
                let probabilities: Vec<String> = actions
                    .iter()
                    .map(|(action, p)| format!("{action}={p:.4}"))
                    .collect();
                print_kv(
                    &format!("player {player} @ {state}"),
                    &probabilities.join("  "),
                );
            }
        }
    }
    Ok(())
}
