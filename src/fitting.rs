//! Maximum-likelihood parameter fitting
//!
//! A model's parameter vector is scored by the summed Bernoulli negative
//! log-likelihood of the human pivotal-choice frequencies under the model's
//! level-K predictions, and minimized over the model's feasible region.

pub mod fit;
pub mod human_data;
pub mod model;
pub mod objective;
pub mod optimizer;

pub use fit::{ConvergenceWarning, FitResult, FitSet, fit};
pub use human_data::{HumanData, HumanTarget};
pub use model::{ModelInstance, ModelKind, ParameterSpace};
pub use objective::{
    Objective, PROBABILITY_FLOOR, PivotalDecision, PivotalDecisions, bernoulli_nll,
    pivotal_from_profile, pivotal_probabilities,
};
pub use optimizer::{Minimum, ProjectedGradient, Status};
