//! Per-level policy tables

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    game::{Game, PerPlayer, Player},
    identifiers::{ActionId, StateId, StateIndex},
};

/// Labelled policy: state → action → probability.
pub type PolicyTable = BTreeMap<StateId, BTreeMap<ActionId, f64>>;

/// One player's choice distributions at one reasoning level.
///
/// Stored as an arena parallel to the game's states; only the player's
/// decision states carry an entry, in the game's action order.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    player: Player,
    level: usize,
    entries: Vec<Option<Vec<f64>>>,
}

impl Policy {
    pub(crate) fn empty(game: &Game, player: Player, level: usize) -> Self {
        Self {
            player,
            level,
            entries: vec![None; game.state_count()],
        }
    }

    pub(crate) fn insert(&mut self, state: StateIndex, distribution: Vec<f64>) {
        self.entries[state.get()] = Some(distribution);
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Distribution over the actions at `state`, if the player acts there.
    pub fn distribution(&self, state: StateIndex) -> Option<&[f64]> {
        self.entries.get(state.get())?.as_deref()
    }

    /// Probability of the action at position `action`; 0 when absent.
    pub fn probability(&self, state: StateIndex, action: usize) -> f64 {
        self.distribution(state)
            .and_then(|dist| dist.get(action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Probability of a labelled action at a labelled state.
    ///
    /// `None` when the state is unknown, the player does not act there, or
    /// the action is not available.
    pub fn probability_of(&self, game: &Game, state: StateId, action: &str) -> Option<f64> {
        let index = game.index_of(state)?;
        let position = game.action_index(index, action)?;
        self.distribution(index)?.get(position).copied()
    }

    /// States with an entry, in arena order.
    pub fn states(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_some())
            .map(|(i, _)| StateIndex(i))
    }

    /// Export with the game's state and action labels.
    pub fn to_table(&self, game: &Game) -> PolicyTable {
        self.states()
            .filter_map(|state| {
                let dist = self.distribution(state)?;
                let actions = game
                    .available(state)
                    .iter()
                    .zip(dist)
                    .map(|(action, &p)| (action.label.clone(), p))
                    .collect();
                Some((game.state_id(state), actions))
            })
            .collect()
    }
}

/// Both players' policies at the same reasoning level.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyProfile {
    pub level: usize,
    pub policies: PerPlayer<Policy>,
}

impl PolicyProfile {
    pub fn policy(&self, player: Player) -> &Policy {
        &self.policies[player]
    }

    /// Serializable form of the profile for one game.
    pub fn export(&self, game: &Game) -> ProfileExport {
        ProfileExport {
            game: game.name().to_string(),
            level: self.level,
            policies: Player::BOTH
                .into_iter()
                .map(|player| (player, self.policies[player].to_table(game)))
                .collect(),
        }
    }
}

/// JSON-friendly policy profile: game name, level, and per-player tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileExport {
    pub game: String,
    pub level: usize,
    pub policies: BTreeMap<Player, PolicyTable>,
}
