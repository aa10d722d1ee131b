//! Projected gradient descent over a constrained parameter space
//!
//! Gradients come from central finite differences (one-sided at a bound),
//! step sizes from Armijo backtracking along the projected path.

use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};

use super::model::ParameterSpace;

/// Sufficient-decrease constant of the Armijo condition.
const ARMIJO: f64 = 1e-4;
/// Backtracking halvings before the line search gives up.
const MAX_BACKTRACKS: usize = 40;
const MAX_STEP: f64 = 1e3;

/// Why the minimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Projected gradient or objective decrease fell below tolerance
    Converged,
    /// Iteration budget exhausted
    MaxIterations,
    /// No step along the projected gradient decreased the objective
    LineSearchFailed,
}

impl Status {
    pub fn is_converged(self) -> bool {
        self == Status::Converged
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Converged => f.write_str("converged"),
            Status::MaxIterations => f.write_str("iteration limit reached"),
            Status::LineSearchFailed => f.write_str("line search failed"),
        }
    }
}

/// Best point found by one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub status: Status,
}

/// Projected gradient descent with Armijo backtracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedGradient {
    pub max_iterations: usize,
    pub tolerance: f64,
    /// Relative finite-difference step
    pub gradient_step: f64,
}

impl Default for ProjectedGradient {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
            gradient_step: 1e-5,
        }
    }
}

impl ProjectedGradient {
    pub fn new(max_iterations: usize, tolerance: f64, gradient_step: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            gradient_step,
        }
    }

    /// Minimize `f` over `space` starting from `start` (projected first).
    pub fn minimize<F>(&self, f: F, space: &ParameterSpace, start: &[f64]) -> Minimum
    where
        F: Fn(&[f64]) -> f64,
    {
        let mut evaluations = 0;
        let mut eval = |x: &[f64]| {
            evaluations += 1;
            f(x)
        };

        let mut x = space.projected(start);
        let mut value = eval(&x);
        let mut step = 1.0;
        let mut status = Status::MaxIterations;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            let gradient = self.gradient(&mut eval, space, &x);

            // stationarity measure: x − P(x − ∇f)
            let stationarity = x
                .iter()
                .zip(&space.projected(&difference(&x, &gradient, 1.0)))
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            if stationarity < self.tolerance {
                status = Status::Converged;
                break;
            }

            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let candidate = space.projected(&difference(&x, &gradient, step));
                let moved: f64 = candidate
                    .iter()
                    .zip(&x)
                    .zip(&gradient)
                    .map(|((c, x), g)| g * (c - x))
                    .sum();
                let candidate_value = eval(&candidate);
                if candidate_value.is_finite() && candidate_value <= value + ARMIJO * moved {
                    accepted = Some((candidate, candidate_value));
                    break;
                }
                step *= 0.5;
            }

            let Some((candidate, candidate_value)) = accepted else {
                status = Status::LineSearchFailed;
                break;
            };

            iterations += 1;
            let decrease = value - candidate_value;
            x = candidate;
            value = candidate_value;
            trace!("iteration {iterations}: objective {value:.6}, step {step:.3e}");

            if decrease < self.tolerance * (1.0 + value.abs()) {
                status = Status::Converged;
                break;
            }
            step = (step * 2.0).min(MAX_STEP);
        }

        Minimum {
            x,
            value,
            iterations,
            evaluations,
            status,
        }
    }

    fn gradient<E>(&self, eval: &mut E, space: &ParameterSpace, x: &[f64]) -> Vec<f64>
    where
        E: FnMut(&[f64]) -> f64,
    {
        let mut probe = x.to_vec();
        (0..x.len())
            .map(|i| {
                let h = self.gradient_step * x[i].abs().max(1.0);
                let hi = (x[i] + h).min(space.upper[i]);
                let lo = (x[i] - h).max(space.lower[i]);
                if hi <= lo {
                    return 0.0;
                }
                probe[i] = hi;
                let f_hi = eval(&probe);
                probe[i] = lo;
                let f_lo = eval(&probe);
                probe[i] = x[i];
                (f_hi - f_lo) / (hi - lo)
            })
            .collect()
    }
}

fn difference(x: &[f64], direction: &[f64], scale: f64) -> Vec<f64> {
    x.iter()
        .zip(direction)
        .map(|(a, d)| a - scale * d)
        .collect()
}
