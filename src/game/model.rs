//! Validated, immutable extensive-form game

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use super::{GameConfig, PerPlayer, Player};
use crate::{
    Error, Result,
    identifiers::{ActionId, StateId, StateIndex},
};

/// An action available at a decision state and the state it leads to.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub label: ActionId,
    pub target: StateIndex,
}

/// One move on a path through the game: `player` took the action at position
/// `action` of `state`'s action list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub player: Player,
    pub state: StateIndex,
    pub action: usize,
}

#[derive(Debug, Clone)]
struct StateNode {
    id: StateId,
    mover: Option<Player>,
    actions: Vec<Action>,
    reward: PerPlayer<f64>,
}

/// Extremes over a game's terminal payoffs.
///
/// Used by the reciprocity preference to decide whether a forgone option was
/// the mutually best outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoffSummary {
    /// Largest `payoff(1) + payoff(2)` over terminal states
    pub max_joint: f64,
    /// Largest payoff each player can receive at a terminal state
    pub max_payoff: PerPlayer<f64>,
}

/// A finite two-player game with deterministic transitions.
///
/// States live in an arena addressed by [`StateIndex`]; every non-terminal
/// state has exactly one acting player. A `Game` never changes after
/// construction and can be shared freely between solvers.
#[derive(Debug, Clone)]
pub struct Game {
    name: String,
    config: GameConfig,
    states: Vec<StateNode>,
    index: HashMap<StateId, StateIndex>,
    initial: StateIndex,
    reachable: Vec<StateIndex>,
    parents: Vec<Option<Decision>>,
    summary: PayoffSummary,
}

impl Game {
    /// Validate a configuration and build the game.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an action is listed twice at a state,
    /// an action has no transition, a transition points at a state the
    /// configuration never defines, both players act at the same state, a
    /// terminal state has no reward entry, or the initial state is unknown.
    /// Players missing from a reward entry receive 0.
    pub fn from_config(name: impl Into<String>, config: &GameConfig) -> Result<Self> {
        let name = name.into();

        let declared: BTreeSet<StateId> = config
            .transitions
            .keys()
            .chain(config.actions.keys())
            .chain(config.rewards.keys())
            .copied()
            .collect();

        if !declared.contains(&config.initial_state) {
            return Err(Error::UnknownInitialState {
                game: name,
                state: config.initial_state.get(),
            });
        }

        let ids: Vec<StateId> = declared.into_iter().collect();
        let index: HashMap<StateId, StateIndex> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, StateIndex(i)))
            .collect();

        let mut states = Vec::with_capacity(ids.len());
        for &id in &ids {
            let per_player = config.actions.get(&id);
            let acting: Vec<(Player, &Vec<ActionId>)> = Player::BOTH
                .into_iter()
                .filter_map(|player| {
                    per_player
                        .and_then(|m| m.get(&player))
                        .filter(|actions| !actions.is_empty())
                        .map(|actions| (player, actions))
                })
                .collect();

            if acting.len() > 1 {
                return Err(Error::SimultaneousMove {
                    game: name,
                    state: id.get(),
                });
            }

            let mut node = StateNode {
                id,
                mover: None,
                actions: Vec::new(),
                reward: reward_entry(config, id),
            };

            if let Some(&(player, labels)) = acting.first() {
                let mut seen = HashSet::new();
                for label in labels {
                    if !seen.insert(label) {
                        return Err(Error::DuplicateAction {
                            game: name,
                            state: id.get(),
                            action: label.to_string(),
                        });
                    }
                    let Some(target) = config
                        .transitions
                        .get(&id)
                        .and_then(|moves| moves.get(label))
                    else {
                        return Err(Error::MissingTransition {
                            game: name,
                            state: id.get(),
                            action: label.to_string(),
                        });
                    };
                    let Some(&target) = index.get(target) else {
                        return Err(Error::DanglingTransition {
                            game: name,
                            state: id.get(),
                            action: label.to_string(),
                            target: target.get(),
                        });
                    };
                    node.actions.push(Action {
                        label: label.clone(),
                        target,
                    });
                }
                node.mover = Some(player);
            } else if !config.rewards.contains_key(&id) {
                return Err(Error::MissingReward {
                    game: name,
                    state: id.get(),
                });
            }

            states.push(node);
        }

        let initial = index[&config.initial_state];
        let (reachable, parents) = breadth_first(&states, initial);
        let summary = summarize(&states, &reachable);

        Ok(Self {
            name,
            config: config.clone(),
            states,
            index,
            initial,
            reachable,
            parents,
            summary,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration this game was built from.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn initial_state(&self) -> StateIndex {
        self.initial
    }

    /// Number of states in the arena.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn opponent(&self, player: Player) -> Player {
        player.opponent()
    }

    /// External label of a state.
    pub fn state_id(&self, state: StateIndex) -> StateId {
        self.states[state.0].id
    }

    /// Arena index of a labelled state, if the game defines it.
    pub fn index_of(&self, id: StateId) -> Option<StateIndex> {
        self.index.get(&id).copied()
    }

    /// The player who acts at `state`, or `None` at terminal states.
    pub fn mover(&self, state: StateIndex) -> Option<Player> {
        self.states[state.0].mover
    }

    /// Actions available to `player` at `state`; empty when someone else (or
    /// nobody) acts there.
    pub fn actions(&self, state: StateIndex, player: Player) -> &[Action] {
        let node = &self.states[state.0];
        if node.mover == Some(player) {
            &node.actions
        } else {
            &[]
        }
    }

    /// Actions at `state` regardless of who takes them.
    pub fn available(&self, state: StateIndex) -> &[Action] {
        &self.states[state.0].actions
    }

    /// Position of the labelled action within the state's action list.
    pub fn action_index(&self, state: StateIndex, label: &str) -> Option<usize> {
        self.states[state.0]
            .actions
            .iter()
            .position(|action| action.label == label)
    }

    /// Successor reached by taking `action` at `state`.
    pub fn transition(&self, state: StateIndex, action: &str) -> Option<StateIndex> {
        self.states[state.0]
            .actions
            .iter()
            .find(|candidate| candidate.label == action)
            .map(|candidate| candidate.target)
    }

    /// True when neither player can act at `state`.
    pub fn is_terminal(&self, state: StateIndex) -> bool {
        self.states[state.0].mover.is_none()
    }

    /// Payoff vector at `state` (zeros where the reward table is silent).
    pub fn reward(&self, state: StateIndex) -> PerPlayer<f64> {
        self.states[state.0].reward
    }

    /// Payoff for one player at `state`.
    pub fn payoff(&self, state: StateIndex, player: Player) -> f64 {
        self.states[state.0].reward[player]
    }

    /// States reachable from the initial state, breadth-first.
    pub fn reachable_states(&self) -> &[StateIndex] {
        &self.reachable
    }

    /// Reachable states at which `player` acts, breadth-first.
    pub fn decision_states(&self, player: Player) -> impl Iterator<Item = StateIndex> + '_ {
        self.reachable
            .iter()
            .copied()
            .filter(move |&state| self.mover(state) == Some(player))
    }

    /// Reachable terminal states, breadth-first.
    pub fn terminal_states(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.reachable
            .iter()
            .copied()
            .filter(|&state| self.is_terminal(state))
    }

    /// Decisions leading from the initial state to `state` along the
    /// breadth-first discovery path. Empty for the initial state and for
    /// unreachable states.
    pub fn history(&self, state: StateIndex) -> Vec<Decision> {
        let mut path = Vec::new();
        let mut cursor = state;
        while let Some(step) = self.parents[cursor.0] {
            path.push(step);
            cursor = step.state;
        }
        path.reverse();
        path
    }

    pub fn payoff_summary(&self) -> &PayoffSummary {
        &self.summary
    }

    /// Longest number of moves from the initial state to a terminal state,
    /// or `None` if a cycle is reachable.
    pub fn depth(&self) -> Option<usize> {
        fn visit(
            game: &Game,
            state: StateIndex,
            on_path: &mut [bool],
            memo: &mut [Option<usize>],
        ) -> Option<usize> {
            if let Some(depth) = memo[state.0] {
                return Some(depth);
            }
            if on_path[state.0] {
                return None;
            }
            on_path[state.0] = true;
            let mut deepest = 0;
            for action in game.available(state) {
                deepest = deepest.max(visit(game, action.target, on_path, memo)? + 1);
            }
            on_path[state.0] = false;
            memo[state.0] = Some(deepest);
            Some(deepest)
        }

        let mut on_path = vec![false; self.states.len()];
        let mut memo = vec![None; self.states.len()];
        visit(self, self.initial, &mut on_path, &mut memo)
    }
}

fn reward_entry(config: &GameConfig, id: StateId) -> PerPlayer<f64> {
    let entry = config.rewards.get(&id);
    PerPlayer::from_fn(|player| {
        entry
            .and_then(|payoffs| payoffs.get(&player))
            .copied()
            .unwrap_or(0.0)
    })
}

fn breadth_first(
    states: &[StateNode],
    initial: StateIndex,
) -> (Vec<StateIndex>, Vec<Option<Decision>>) {
    let mut order = Vec::with_capacity(states.len());
    let mut parents = vec![None; states.len()];
    let mut seen = vec![false; states.len()];
    let mut queue = VecDeque::from([initial]);
    seen[initial.0] = true;

    while let Some(state) = queue.pop_front() {
        order.push(state);
        let node = &states[state.0];
        let Some(player) = node.mover else {
            continue;
        };
        for (position, action) in node.actions.iter().enumerate() {
            if !seen[action.target.0] {
                seen[action.target.0] = true;
                parents[action.target.0] = Some(Decision {
                    player,
                    state,
                    action: position,
                });
                queue.push_back(action.target);
            }
        }
    }

    (order, parents)
}

/// Maxima over the terminals reachable from the initial state.
fn summarize(states: &[StateNode], reachable: &[StateIndex]) -> PayoffSummary {
    let mut summary = PayoffSummary {
        max_joint: f64::NEG_INFINITY,
        max_payoff: PerPlayer::splat(f64::NEG_INFINITY),
    };
    for node in reachable
        .iter()
        .map(|state| &states[state.0])
        .filter(|node| node.mover.is_none())
    {
        let reward = node.reward;
        summary.max_joint = summary
            .max_joint
            .max(reward[Player::One] + reward[Player::Two]);
        for player in Player::BOTH {
            summary.max_payoff[player] = summary.max_payoff[player].max(reward[player]);
        }
    }
    summary
}
