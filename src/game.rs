//! Sequential two-player sharing games

pub mod config;
pub mod model;
pub mod player;
pub mod stimuli;

pub use config::GameConfig;
pub use model::{Action, Decision, Game, PayoffSummary};
pub use player::{PerPlayer, Player};
pub use stimuli::{Battery, NamedGame, sharing_game};
