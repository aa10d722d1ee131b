//! Staged level-K policy computation
//!
//! Level 0 is uniform. A level-k player best-responds (through a softmax) to
//! the opponent's level-(k−1) policy. Levels are built bottom-up: the
//! opponent's level-(k−1) table is computed over all of the opponent's
//! decision states and frozen before any level-k value is evaluated.

use std::collections::BTreeMap;

use log::trace;

use super::{
    policy::{Policy, PolicyProfile},
    softmax::{softmax, softmax_expectation, uniform},
};
use crate::{
    Error, Result,
    game::{Decision, Game, PerPlayer, Player},
    identifiers::StateIndex,
    utility::{SocialPreference, TerminalContext},
};

/// Default recursion bound, enough for the deepest stimulus tree.
pub const DEFAULT_MAX_PLY: usize = 3;

/// Level-K solver for one game, one preference and one pair of β values.
///
/// The solver owns its ladder of computed levels; asking for a level that
/// is already known returns the frozen table.
///
/// # Examples
///
/// ```
/// use levelk::game::{Game, PerPlayer, Player, sharing_game};
/// use levelk::identifiers::StateId;
/// use levelk::solver::LevelKSolver;
/// use levelk::utility::Selfish;
///
/// let config = sharing_game((5.0, 5.0), (10.0, 10.0), (0.0, 0.0));
/// let game = Game::from_config("common_interest", &config)?;
/// let mut solver = LevelKSolver::new(&game, &Selfish, PerPlayer::new(1.0, 1.0))?;
///
/// let p_in = solver
///     .solve(Player::One, 1)
///     .probability_of(&game, StateId::new(1), "In")
///     .unwrap();
/// assert!((p_in - 0.5).abs() < 1e-12);
/// # Ok::<(), levelk::Error>(())
/// ```
#[derive(Debug)]
pub struct LevelKSolver<'a> {
    game: &'a Game,
    preference: &'a dyn SocialPreference,
    betas: PerPlayer<f64>,
    max_ply: usize,
    ladder: PerPlayer<BTreeMap<usize, Policy>>,
}

impl<'a> LevelKSolver<'a> {
    /// Create a solver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBeta`] if either inverse temperature is
    /// negative or not finite.
    pub fn new(
        game: &'a Game,
        preference: &'a dyn SocialPreference,
        betas: PerPlayer<f64>,
    ) -> Result<Self> {
        for (player, &value) in betas.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidBeta { player, value });
            }
        }
        Ok(Self {
            game,
            preference,
            betas,
            max_ply: DEFAULT_MAX_PLY,
            ladder: PerPlayer::default(),
        })
    }

    /// Override the recursion bound. Values below 1 are raised to 1.
    pub fn with_max_ply(mut self, max_ply: usize) -> Self {
        self.max_ply = max_ply.max(1);
        self.ladder = PerPlayer::default();
        self
    }

    pub fn game(&self) -> &Game {
        self.game
    }

    pub fn betas(&self) -> PerPlayer<f64> {
        self.betas
    }

    pub fn max_ply(&self) -> usize {
        self.max_ply
    }

    /// Policy of `player` at `level`, computing the missing rungs first.
    pub fn solve(&mut self, player: Player, level: usize) -> &Policy {
        self.ensure(player, level);
        &self.ladder[player][&level]
    }

    /// Both players at the same level.
    pub fn profile(&mut self, level: usize) -> PolicyProfile {
        let policies = PerPlayer::from_fn(|player| self.solve(player, level).clone());
        PolicyProfile { level, policies }
    }

    /// Values `player` assigns to each action at `state` when reasoning at
    /// `level`, in the game's action order.
    ///
    /// `None` at level 0 (no utilities are evaluated) and at states where
    /// the player does not act.
    pub fn action_values(
        &mut self,
        player: Player,
        level: usize,
        state: StateIndex,
    ) -> Option<Vec<f64>> {
        if level == 0 || self.game.mover(state) != Some(player) {
            return None;
        }
        self.ensure(player.opponent(), level - 1);
        let opponent = &self.ladder[player.opponent()][&(level - 1)];
        Some(self.values_at(player, opponent, state))
    }

    /// Compute every rung `player` at `level` depends on, lowest first.
    fn ensure(&mut self, player: Player, level: usize) {
        let mut pending = Vec::new();
        let (mut who, mut k) = (player, level);
        loop {
            if self.ladder[who].contains_key(&k) {
                break;
            }
            pending.push((who, k));
            if k == 0 {
                break;
            }
            who = who.opponent();
            k -= 1;
        }

        while let Some((who, k)) = pending.pop() {
            let policy = if k == 0 {
                self.level_zero(who)
            } else {
                let opponent = &self.ladder[who.opponent()][&(k - 1)];
                self.best_response(who, k, opponent)
            };
            trace!(
                "game '{}': froze level {} policy for player {}",
                self.game.name(),
                k,
                who
            );
            self.ladder[who].insert(k, policy);
        }
    }

    fn level_zero(&self, player: Player) -> Policy {
        let mut policy = Policy::empty(self.game, player, 0);
        for state in self.game.decision_states(player) {
            policy.insert(state, uniform(self.game.available(state).len()));
        }
        policy
    }

    fn best_response(&self, player: Player, level: usize, opponent: &Policy) -> Policy {
        let mut policy = Policy::empty(self.game, player, level);
        for state in self.game.decision_states(player) {
            let values = self.values_at(player, opponent, state);
            policy.insert(state, softmax(&values, self.betas[player]));
        }
        policy
    }

    fn values_at(&self, player: Player, opponent: &Policy, state: StateIndex) -> Vec<f64> {
        let mut path = self.game.history(state);
        self.game
            .available(state)
            .iter()
            .enumerate()
            .map(|(position, action)| {
                path.push(Decision {
                    player,
                    state,
                    action: position,
                });
                let value = self.state_value(player, opponent, action.target, &mut path, 1);
                path.pop();
                value
            })
            .collect()
    }

    /// Value to `player` of arriving at `state` after `ply` moves.
    fn state_value(
        &self,
        player: Player,
        opponent: &Policy,
        state: StateIndex,
        path: &mut Vec<Decision>,
        ply: usize,
    ) -> f64 {
        let Some(mover) = self.game.mover(state) else {
            let reward = self.game.reward(state);
            let context = TerminalContext::new(self.game, player, state, path);
            return self.preference.terminal_utility(
                reward[player],
                reward[player.opponent()],
                &context,
            );
        };
        if ply >= self.max_ply {
            return 0.0;
        }

        let actions = self.game.available(state);
        let mut values = Vec::with_capacity(actions.len());
        for (position, action) in actions.iter().enumerate() {
            path.push(Decision {
                player: mover,
                state,
                action: position,
            });
            values.push(self.state_value(player, opponent, action.target, path, ply + 1));
            path.pop();
        }

        if mover == player {
            softmax_expectation(&values, self.betas[player])
        } else {
            let weights = opponent
                .distribution(state)
                .map(<[f64]>::to_vec)
                .unwrap_or_else(|| uniform(values.len()));
            weights.iter().zip(&values).map(|(w, v)| w * v).sum()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::{GameConfig, sharing_game},
        identifiers::StateId,
        utility::{InequalityAversion, Reciprocity, Selfish},
    };

    fn common_interest() -> Game {
        let config = sharing_game((5.0, 5.0), (10.0, 10.0), (0.0, 0.0));
        Game::from_config("common_interest", &config).unwrap()
    }

    fn p_in(solver: &mut LevelKSolver<'_>, level: usize) -> f64 {
        let game = solver.game;
        solver
            .solve(Player::One, level)
            .probability_of(game, StateId::new(1), "In")
            .unwrap()
    }

    fn p_right(solver: &mut LevelKSolver<'_>, level: usize) -> f64 {
        let game = solver.game;
        solver
            .solve(Player::Two, level)
            .probability_of(game, StateId::new(3), "Right")
            .unwrap()
    }

    #[test]
    fn test_level_zero_is_uniform() {
        let game = common_interest();
        let mut solver = LevelKSolver::new(&game, &Selfish, PerPlayer::new(1.0, 1.0)).unwrap();
        for player in Player::BOTH {
            let policy = solver.solve(player, 0).clone();
            for state in game.decision_states(player) {
                let dist = policy.distribution(state).unwrap();
                assert!(dist.iter().all(|&p| (p - 0.5).abs() < 1e-15));
            }
        }
    }

    #[test]
    fn test_common_interest_ladder() {
        let game = common_interest();
        let mut solver = LevelKSolver::new(&game, &Selfish, PerPlayer::new(1.0, 1.0)).unwrap();

        assert!((p_in(&mut solver, 1) - 0.5).abs() < 1e-12);
        let expected_right = 1.0 / (1.0 + 10f64.exp());
        assert!((p_right(&mut solver, 1) - expected_right).abs() < 1e-12);

        let inside = game.index_of(StateId::new(3)).unwrap();
        let values = solver.action_values(Player::Two, 1, inside).unwrap();
        assert_eq!(values, vec![10.0, 0.0]);

        let root = game.initial_state();
        let values = solver.action_values(Player::One, 2, root).unwrap();
        assert_eq!(values[0], 5.0);
        assert!((values[1] - 10.0 * (1.0 - expected_right)).abs() < 1e-9);

        let p2 = p_in(&mut solver, 2);
        assert!((p2 - 0.9933).abs() < 1e-4, "p(In) at level 2 was {p2}");
    }

    #[test]
    fn test_levels_are_deterministic() {
        let game = common_interest();
        let preference = InequalityAversion::new(PerPlayer::new(0.3, 1.2), PerPlayer::new(0.1, 0.4));
        let mut first = LevelKSolver::new(&game, &preference, PerPlayer::new(0.7, 2.0)).unwrap();
        let mut second = LevelKSolver::new(&game, &preference, PerPlayer::new(0.7, 2.0)).unwrap();
        assert_eq!(first.profile(3), second.profile(3));
    }

    #[test]
    fn test_temperature_extremes() {
        let game = common_interest();
        let mut cold = LevelKSolver::new(&game, &Selfish, PerPlayer::new(0.0, 0.0)).unwrap();
        assert!((p_in(&mut cold, 2) - 0.5).abs() < 1e-12);
        assert!((p_right(&mut cold, 1) - 0.5).abs() < 1e-12);

        let mut hot = LevelKSolver::new(&game, &Selfish, PerPlayer::new(100.0, 100.0)).unwrap();
        assert!(p_in(&mut hot, 2) > 1.0 - 1e-9);
        assert!(p_right(&mut hot, 1) < 1e-9);
    }

    #[test]
    fn test_neutral_preferences_match_selfish() {
        let config = sharing_game((10.0, 15.0), (3.0, 5.0), (10.0, 3.0));
        let game = Game::from_config("rational_punish_A", &config).unwrap();
        let betas = PerPlayer::new(0.8, 1.7);

        let selfish = LevelKSolver::new(&game, &Selfish, betas).unwrap().profile(2);
        let ia = InequalityAversion::neutral();
        let reciprocity = Reciprocity::neutral();
        assert_eq!(LevelKSolver::new(&game, &ia, betas).unwrap().profile(2), selfish);
        assert_eq!(
            LevelKSolver::new(&game, &reciprocity, betas).unwrap().profile(2),
            selfish
        );
    }

    #[test]
    fn test_max_ply_bound_returns_zero() {
        let game = common_interest();
        let mut solver = LevelKSolver::new(&game, &Selfish, PerPlayer::new(1.0, 1.0))
            .unwrap()
            .with_max_ply(1);
        let values = solver
            .action_values(Player::One, 1, game.initial_state())
            .unwrap();
        assert_eq!(values, vec![5.0, 0.0]);
    }

    #[test]
    fn test_invalid_beta_rejected() {
        let game = common_interest();
        let err = LevelKSolver::new(&game, &Selfish, PerPlayer::new(-1.0, 1.0)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidBeta {
                player: Player::One,
                ..
            }
        ));
        assert!(LevelKSolver::new(&game, &Selfish, PerPlayer::new(1.0, f64::NAN)).is_err());
    }

    #[test]
    fn test_own_later_decision_uses_softmax_expectation() {
        // 1 -(Go)-> 2 (player 2 passes) -> 3 (player 1 picks 4 or 5)
        let config = GameConfig::new(1)
            .with_decision(1, Player::One, [("Stop", 6), ("Go", 2)])
            .with_decision(2, Player::Two, [("Pass", 3)])
            .with_decision(3, Player::One, [("A", 4), ("B", 5)])
            .with_reward(4, 8.0, 0.0)
            .with_reward(5, 2.0, 0.0)
            .with_reward(6, 1.0, 0.0);
        let game = Game::from_config("three_moves", &config).unwrap();
        let mut solver = LevelKSolver::new(&game, &Selfish, PerPlayer::new(0.5, 1.0)).unwrap();

        let values = solver
            .action_values(Player::One, 1, game.initial_state())
            .unwrap();
        let expected = softmax_expectation(&[8.0, 2.0], 0.5);
        assert_eq!(values[0], 1.0);
        assert!((values[1] - expected).abs() < 1e-12);

        // with the default bound the third move is reachable; a bound of 2 cuts it
        let mut shallow = LevelKSolver::new(&game, &Selfish, PerPlayer::new(0.5, 1.0))
            .unwrap()
            .with_max_ply(2);
        let values = shallow
            .action_values(Player::One, 1, game.initial_state())
            .unwrap();
        assert_eq!(values[1], 0.0);
    }
}
