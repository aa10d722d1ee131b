//! Predict command - Held-out predictions from fitted parameters

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use super::BatterySource;
use crate::{
    analysis::{Evaluation, GamePrediction, confidence_half_width, predict, write_predictions},
    cli::output::{format_optional, print_kv, print_section, print_subsection},
    config::{DEFAULT_LEVEL, SolverConfig},
    fitting::{FitSet, HumanData, ModelKind, PivotalDecisions},
    game::Player,
    solver::DEFAULT_MAX_PLY,
};

/// Participants per experiment, used for confidence intervals.
const DEFAULT_PARTICIPANTS: usize = 42;

#[derive(Parser, Debug)]
#[command(about = "Predict choices on a battery with fitted parameters")]
pub struct PredictArgs {
    /// Fitted parameters written by `levelk fit --output`
    #[arg(long, short = 'f')]
    pub fits: PathBuf,

    #[command(flatten)]
    pub source: BatterySource,

    /// Only predict with these models (default: every fitted model)
    #[arg(long, short = 'm')]
    pub model: Vec<ModelKind>,

    /// Human summary CSV to evaluate predictions against
    #[arg(long, short = 'd')]
    pub data: Option<PathBuf>,

    /// Participants behind each human mean
    #[arg(long, default_value_t = DEFAULT_PARTICIPANTS)]
    pub participants: usize,

    /// Reasoning level used for predictions
    #[arg(long, short = 'k', default_value_t = DEFAULT_LEVEL)]
    pub level: usize,

    /// Recursion bound in moves
    #[arg(long, default_value_t = DEFAULT_MAX_PLY)]
    pub max_ply: usize,

    /// Write predictions as CSV
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn execute(args: PredictArgs) -> Result<()> {
    let fits = FitSet::load(&args.fits)
        .with_context(|| format!("Failed to load fits from {}", args.fits.display()))?;
    let battery = args.source.load("exp3")?;
    let games = battery.build()?;
    let data = args
        .data
        .as_ref()
        .map(|path| {
            HumanData::load(path)
                .with_context(|| format!("Failed to load human data from {}", path.display()))
        })
        .transpose()?;

    let solver = SolverConfig::default()
        .with_level(args.level)
        .with_max_ply(args.max_ply);
    let pivotal = PivotalDecisions::default();

    let mut all = Vec::new();
    for fit in fits.iter() {
        if !args.model.is_empty() && !args.model.contains(&fit.model) {
            continue;
        }
        let predictions = predict(fit, &games, &solver, &pivotal)
            .with_context(|| format!("Predicting with {} failed", fit.model))?;

        print_section(&format!(
            "{} predictions on {}",
            fit.model,
            args.source.describe("exp3")
        ));
        print_predictions(&predictions, data.as_ref(), args.participants);

        if let Some(data) = &data {
            let evaluation = Evaluation::compute(&predictions, data)?;
            print_evaluation(&evaluation);
        }
        all.extend(predictions);
    }

    if all.is_empty() {
        println!("No fitted models to predict with");
        return Ok(());
    }

    if let Some(path) = &args.output {
        write_predictions(path, &all)
            .with_context(|| format!("Failed to write predictions to {}", path.display()))?;
        println!("\nWrote {} predictions to {}", all.len(), path.display());
    }
    Ok(())
}

fn print_predictions(predictions: &[GamePrediction], data: Option<&HumanData>, participants: usize) {
    for prediction in predictions {
        print_subsection(&prediction.game);
        for player in Player::BOTH {
            let observed = data
                .and_then(|data| data.get(&prediction.game))
                .map(|target| {
                    let ci = target.sd[player]
                        .map(|sd| format!(" ± {:.3}", confidence_half_width(sd, participants)))
                        .unwrap_or_default();
                    format!("  (human {:.3}{ci})", target.mean[player])
                })
                .unwrap_or_default();
            print_kv(
                &format!("player {player} pivotal"),
                &format!("{}{observed}", format_optional(prediction.pivotal[player])),
            );
        }
        let power = &prediction.power;
        print_kv(
            "EU",
            &format!(
                "({:.3}, {:.3})",
                power.expected_utility[Player::One],
                power.expected_utility[Player::Two]
            ),
        );
        print_kv("REU", &format!("{:.3}", power.reu));
        print_kv("RCR", &format!("{:.3}", power.rcr));
    }
}

fn print_evaluation(evaluation: &Evaluation) {
    print_subsection(&format!(
        "Agreement with human data ({} games)",
        evaluation.games.len()
    ));
    for player in Player::BOTH {
        match &evaluation.agreement[player] {
            Some(agreement) => {
                print_kv(
                    &format!("player {player} r"),
                    &format_optional(agreement.pearson_r),
                );
                print_kv(
                    &format!("player {player} R²"),
                    &format_optional(agreement.r_squared),
                );
                print_kv(
                    &format!("player {player} adj. R²"),
                    &format_optional(agreement.adjusted_r_squared),
                );
                print_kv(
                    &format!("player {player} MSE"),
                    &format!("{:.4}", agreement.mse),
                );
            }
            None => print_kv(&format!("player {player}"), "too few games"),
        }
    }
}
