//! Declarative game configuration (the stimulus wire format)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Player;
use crate::identifiers::{ActionId, StateId};

/// Declarative description of one game, as produced by stimulus tables.
///
/// ```json
/// {
///   "transitions": { "1": { "Out": 2, "In": 3 }, "3": { "Left": 4, "Right": 5 } },
///   "rewards": { "2": { "1": 5, "2": 5 }, "4": { "1": 10, "2": 10 }, "5": { "1": 0, "2": 0 } },
///   "actions": { "1": { "1": ["Out", "In"] }, "3": { "2": ["Left", "Right"] } },
///   "initial_state": 1
/// }
/// ```
///
/// Validation happens in [`Game::from_config`](super::Game::from_config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// state -> {action -> successor state}
    pub transitions: BTreeMap<StateId, BTreeMap<ActionId, StateId>>,
    /// terminal state -> {player -> payoff}; absent players receive 0
    pub rewards: BTreeMap<StateId, BTreeMap<Player, f64>>,
    /// state -> {player -> ordered actions}
    pub actions: BTreeMap<StateId, BTreeMap<Player, Vec<ActionId>>>,
    pub initial_state: StateId,
}

impl GameConfig {
    /// Start an empty configuration rooted at `initial_state`.
    pub fn new(initial_state: u32) -> Self {
        Self {
            transitions: BTreeMap::new(),
            rewards: BTreeMap::new(),
            actions: BTreeMap::new(),
            initial_state: StateId::new(initial_state),
        }
    }

    /// Add a decision for `player` at `state`: each `(action, target)` pair is
    /// appended in order.
    pub fn with_decision<A>(
        mut self,
        state: u32,
        player: Player,
        moves: impl IntoIterator<Item = (A, u32)>,
    ) -> Self
    where
        A: Into<ActionId>,
    {
        let state = StateId::new(state);
        for (action, target) in moves {
            let action = action.into();
            self.transitions
                .entry(state)
                .or_default()
                .insert(action.clone(), StateId::new(target));
            self.actions
                .entry(state)
                .or_default()
                .entry(player)
                .or_default()
                .push(action);
        }
        self
    }

    /// Add a terminal reward entry.
    pub fn with_reward(mut self, state: u32, one: f64, two: f64) -> Self {
        self.rewards.insert(
            StateId::new(state),
            BTreeMap::from([(Player::One, one), (Player::Two, two)]),
        );
        self
    }
}
