//! Configuration for solving and fitting.

use serde::{Deserialize, Serialize};

use crate::{fitting::PivotalDecisions, solver::DEFAULT_MAX_PLY};

/// Reasoning level used for every prediction unless overridden.
pub const DEFAULT_LEVEL: usize = 2;

/// Configuration for a level-K solve.
///
/// # Examples
///
/// ```
/// use levelk::config::SolverConfig;
///
/// let config = SolverConfig::default().with_level(3).with_max_ply(4);
/// assert_eq!(config.level, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Reasoning level of both players
    pub level: usize,
    /// Recursion bound in moves
    pub max_ply: usize,
}

impl SolverConfig {
    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    pub fn with_max_ply(mut self, max_ply: usize) -> Self {
        self.max_ply = max_ply;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            max_ply: DEFAULT_MAX_PLY,
        }
    }
}

/// Configuration for maximum-likelihood fitting.
///
/// Defaults: level 2, 500 iterations, tolerance 1e-8, finite-difference
/// step 1e-5, no restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// Reasoning level whose policies are compared to human data
    pub level: usize,
    /// Recursion bound passed to every solver
    pub max_ply: usize,
    /// Iteration budget per start
    pub max_iterations: usize,
    /// Stopping tolerance on the projected gradient and objective decrease
    pub tolerance: f64,
    /// Central finite-difference step
    pub gradient_step: f64,
    /// Additional random starts beyond the initial guess
    pub restarts: usize,
    /// Seed for restart points
    pub seed: Option<u64>,
    /// Decisions whose probabilities are compared to human data
    pub pivotal: PivotalDecisions,
}

impl FitConfig {
    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    pub fn with_max_ply(mut self, max_ply: usize) -> Self {
        self.max_ply = max_ply;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_gradient_step(mut self, step: f64) -> Self {
        self.gradient_step = step;
        self
    }

    /// Add `restarts` random starts drawn from a generator seeded with `seed`.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_pivotal(mut self, pivotal: PivotalDecisions) -> Self {
        self.pivotal = pivotal;
        self
    }

    /// Solver settings implied by this fit.
    pub fn solver(&self) -> SolverConfig {
        SolverConfig {
            level: self.level,
            max_ply: self.max_ply,
        }
    }
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            max_ply: DEFAULT_MAX_PLY,
            max_iterations: 500,
            tolerance: 1e-8,
            gradient_step: 1e-5,
            restarts: 0,
            seed: None,
            pivotal: PivotalDecisions::default(),
        }
    }
}
