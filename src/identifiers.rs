//! Domain identifier types for game states and actions.
//!
//! These types provide type-safe wrappers around the labels used by game
//! configurations, plus the arena index the solver works with internally.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// External label of a game state, as written in a game configuration.
///
/// Stimuli number their states from 1 (root) upwards.
///
/// # Examples
///
/// ```
/// use levelk::identifiers::StateId;
///
/// let state = StateId::new(3);
/// assert_eq!(state.get(), 3);
/// assert_eq!(state.to_string(), "3");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StateId(u32);

impl StateId {
    /// Create a new state identifier.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the numeric label.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StateId {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

/// Label of an action available at a decision state (e.g. `"In"`, `"Right"`).
///
/// # Examples
///
/// ```
/// use levelk::identifiers::ActionId;
///
/// let action = ActionId::new("In");
/// assert_eq!(action.as_str(), "In");
/// assert!(action == "In");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    /// Create a new action identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the identifier into its inner String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<&str> for ActionId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<ActionId> for &str {
    fn eq(&self, other: &ActionId) -> bool {
        *self == other.as_str()
    }
}

impl Borrow<str> for ActionId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for ActionId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Position of a state in a [`Game`](crate::game::Game)'s state arena.
///
/// Indices are only meaningful for the game that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateIndex(pub(crate) usize);

impl StateIndex {
    /// Position in the arena.
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
