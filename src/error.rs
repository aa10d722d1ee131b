//! Error types for the levelk crate

use thiserror::Error;

use crate::game::Player;

/// Main error type for the levelk crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("game '{game}': action '{action}' at state {state} leads to undefined state {target}")]
    DanglingTransition {
        game: String,
        state: u32,
        action: String,
        target: u32,
    },

    #[error("game '{game}': action '{action}' at state {state} has no transition")]
    MissingTransition {
        game: String,
        state: u32,
        action: String,
    },

    #[error("game '{game}': terminal state {state} has no reward entry")]
    MissingReward { game: String, state: u32 },

    #[error("game '{game}': action '{action}' listed twice at state {state}")]
    DuplicateAction {
        game: String,
        state: u32,
        action: String,
    },

    #[error("game '{game}': both players have actions at state {state}")]
    SimultaneousMove { game: String, state: u32 },

    #[error("game '{game}': initial state {state} is not part of the game")]
    UnknownInitialState { game: String, state: u32 },

    #[error("unknown game '{name}'")]
    UnknownGame { name: String },

    #[error("no human data for game '{game}'")]
    DataMismatch { game: String },

    #[error("invalid human data for game '{game}': {reason}")]
    InvalidHumanData { game: String, reason: String },

    #[error("none of the {battery_size} games in the battery have human data")]
    NoUsableGames { battery_size: usize },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("inverse temperature for player {player} must be finite and non-negative, got {value}")]
    InvalidBeta { player: Player, value: f64 },

    #[error("invalid model '{input}'. Expected one of: {expected}")]
    UnknownModel { input: String, expected: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// True for errors raised while constructing a malformed game.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::DanglingTransition { .. }
                | Error::MissingTransition { .. }
                | Error::MissingReward { .. }
                | Error::DuplicateAction { .. }
                | Error::SimultaneousMove { .. }
                | Error::UnknownInitialState { .. }
                | Error::UnknownGame { .. }
        )
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
