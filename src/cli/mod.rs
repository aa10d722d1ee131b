//! CLI infrastructure for the levelk toolkit
//!
//! This module provides the command-line interface for listing stimuli,
//! solving games, fitting social-preference models to human data, and
//! predicting held-out games with fitted parameters.

pub mod commands;
pub mod output;
