//! Analysis of fitted models
//!
//! Held-out predictions with agreement statistics against human data, and
//! power metrics derived from predicted play.

pub mod power;
pub mod prediction;

pub use power::{PowerMetrics, expected_utilities, outcome_distribution};
pub use prediction::{
    Agreement, Evaluation, GamePrediction, Z_95, confidence_half_width, predict,
    write_predictions,
};
