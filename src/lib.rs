//! Level-K social preference models for two-player sharing games
//!
//! This crate provides:
//! - Sequential game trees with validated configurations and built-in batteries
//! - Softmax level-K solver driven by pluggable social preferences
//! - Selfish, inequality-averse and reciprocal utility models
//! - Maximum-likelihood fitting of model parameters to human choice data
//! - Held-out prediction, agreement statistics and power metrics
//!
//! ```
//! use levelk::{Game, LevelKSolver, PerPlayer, Player, Selfish, StateId, sharing_game};
//!
//! let config = sharing_game((5.0, 5.0), (10.0, 10.0), (0.0, 0.0));
//! let game = Game::from_config("common_interest", &config)?;
//! let mut solver = LevelKSolver::new(&game, &Selfish, PerPlayer::new(1.0, 1.0))?;
//!
//! // Level 0 is uniform over available actions.
//! let p_in = solver
//!     .solve(Player::One, 0)
//!     .probability_of(&game, StateId::new(1), "In");
//! assert_eq!(p_in, Some(0.5));
//! # Ok::<(), levelk::Error>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod fitting;
pub mod game;
pub mod identifiers;
pub mod solver;
pub mod utility;

pub use config::{FitConfig, SolverConfig};
pub use error::{Error, Result};
pub use fitting::{FitResult, FitSet, HumanData, ModelKind, fit};
pub use game::{Battery, Game, GameConfig, PerPlayer, Player, sharing_game};
pub use identifiers::{ActionId, StateId};
pub use solver::{LevelKSolver, Policy, PolicyProfile};
pub use utility::{InequalityAversion, Reciprocity, Selfish, SocialPreference};
