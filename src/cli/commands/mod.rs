//! Subcommands of the `levelk` binary

pub mod fit;
pub mod games;
pub mod predict;
pub mod solve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::game::Battery;

/// Where a command takes its games from.
#[derive(Args, Debug, Clone)]
pub struct BatterySource {
    /// JSON battery file (game name → configuration)
    #[arg(long, short = 'b')]
    pub battery: Option<PathBuf>,

    /// Built-in battery used when no file is given (exp1/training, exp3/test)
    #[arg(long, conflicts_with = "battery")]
    pub builtin: Option<String>,
}

impl BatterySource {
    /// Load the battery, falling back to the built-in `default`.
    pub fn load(&self, default: &str) -> Result<Battery> {
        match &self.battery {
            Some(path) => Battery::load(path)
                .with_context(|| format!("Failed to load battery from {}", path.display())),
            None => {
                let name = self.builtin.as_deref().unwrap_or(default);
                Battery::builtin(name)
                    .with_context(|| format!("Unknown built-in battery '{name}'"))
            }
        }
    }

    /// Human-readable origin for report headers.
    pub fn describe(&self, default: &str) -> String {
        match &self.battery {
            Some(path) => path.display().to_string(),
            None => format!("built-in {}", self.builtin.as_deref().unwrap_or(default)),
        }
    }
}
