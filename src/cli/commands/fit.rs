//! Fit command - Maximum-likelihood fits of social preference models

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use super::BatterySource;
use crate::{
    cli::output::{create_spinner, print_kv, print_section, print_subsection},
    config::{DEFAULT_LEVEL, FitConfig},
    fitting::{FitSet, HumanData, ModelKind, fit},
    solver::DEFAULT_MAX_PLY,
};

#[derive(Parser, Debug)]
#[command(about = "Fit model parameters to human choice frequencies")]
pub struct FitArgs {
    #[command(flatten)]
    pub source: BatterySource,

    /// Human summary CSV (Game, Mean_P1_Expectation, Mean_P2_Expectation, optional SD columns)
    #[arg(long, short = 'd')]
    pub data: PathBuf,

    /// Models to fit (default: all three)
    #[arg(long, short = 'm')]
    pub model: Vec<ModelKind>,

    /// Reasoning level compared against the data
    #[arg(long, short = 'k', default_value_t = DEFAULT_LEVEL)]
    pub level: usize,

    /// Recursion bound in moves
    #[arg(long, default_value_t = DEFAULT_MAX_PLY)]
    pub max_ply: usize,

    /// Iteration budget per start
    #[arg(long, default_value_t = 500)]
    pub max_iterations: usize,

    /// Random restarts in addition to the initial guess
    #[arg(long, default_value_t = 0)]
    pub restarts: usize,

    /// Seed for restart points
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write fitted parameters to this JSON file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl FitArgs {
    fn config(&self) -> FitConfig {
        let config = FitConfig::default()
            .with_level(self.level)
            .with_max_ply(self.max_ply)
            .with_max_iterations(self.max_iterations)
            .with_restarts(self.restarts);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    fn models(&self) -> Vec<ModelKind> {
        if self.model.is_empty() {
            ModelKind::ALL.to_vec()
        } else {
            self.model.clone()
        }
    }
}

pub fn execute(args: FitArgs) -> Result<()> {
    let battery = args.source.load("exp1")?;
    let games = battery.build()?;
    let data = HumanData::load(&args.data)
        .with_context(|| format!("Failed to load human data from {}", args.data.display()))?;
    let config = args.config();

    print_section(&format!(
        "Fitting level-{} models on {}",
        config.level,
        args.source.describe("exp1")
    ));
    print_kv("Games", &games.len().to_string());
    print_kv("Human summaries", &data.len().to_string());
    print_kv("Restarts", &config.restarts.to_string());

    let mut fits = FitSet::new();
    for model in args.models() {
        let spinner = create_spinner(&format!("Fitting {model}..."));
        let result = fit(model, &games, &data, &config);
        spinner.finish_and_clear();
        let result = result.with_context(|| format!("Fitting {model} failed"))?;

        print_subsection(&format!("Model: {model}"));
        for (name, value) in &result.parameters {
            print_kv(name, &format!("{value:.4}"));
        }
        print_kv("NLL", &format!("{:.4}", result.objective));
        print_kv(
            "Status",
            &format!("{} ({} iterations)", result.status, result.iterations),
        );
        print_kv("Games used", &result.games_used.to_string());
        if !result.skipped_games.is_empty() {
            print_kv("Skipped", &result.skipped_games.join(", "));
        }
        if let Some(warning) = &result.warning {
            println!("  ⚠ {warning}");
        }
        fits.insert(result);
    }

    if let Some(path) = &args.output {
        fits.save(path)
            .with_context(|| format!("Failed to save fits to {}", path.display()))?;
        println!("\nSaved {} fits to {}", fits.len(), path.display());
    }
    Ok(())
}
