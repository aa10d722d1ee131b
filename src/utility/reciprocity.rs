//! Charness–Rabin style reciprocity
//!
//! The weight a player puts on the other's payoff depends on who is ahead at
//! the outcome, and, for the responding player, on whether the first mover
//! passed up the outcome that was best for everyone.

use serde::{Deserialize, Serialize};

use super::{SocialPreference, TerminalContext};
use crate::game::{PerPlayer, Player};

/// Reciprocity preference.
///
/// `w = ρ·[own > other] + σ·[other > own] + θ·q` and
/// `U = (1 − w)·own + w·other`, where `q = −1` when the opponent forwent
/// cooperation on the way to this outcome and `0` otherwise. Only the
/// responding player carries a θ weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reciprocity {
    /// Weight on the other's payoff when ahead
    pub rho: PerPlayer<f64>,
    /// Weight on the other's payoff when behind
    pub sigma: PerPlayer<f64>,
    /// Punishment weight of the responding player
    pub theta: f64,
}

impl Reciprocity {
    /// The player whose utility the θ term can affect.
    pub const PUNISHER: Player = Player::Two;

    pub fn new(rho: PerPlayer<f64>, sigma: PerPlayer<f64>, theta: f64) -> Self {
        Self { rho, sigma, theta }
    }

    /// All weights zero; equivalent to [`Selfish`](super::Selfish).
    pub fn neutral() -> Self {
        Self::new(PerPlayer::splat(0.0), PerPlayer::splat(0.0), 0.0)
    }

    /// The `θ·q` contribution to the weight for the evaluating player.
    fn reciprocal_term(&self, context: &TerminalContext<'_>) -> f64 {
        if context.player != Self::PUNISHER || self.theta == 0.0 {
            return 0.0;
        }
        if context.opponent_forwent_cooperation() {
            -self.theta
        } else {
            0.0
        }
    }
}

impl SocialPreference for Reciprocity {
    fn name(&self) -> &'static str {
        "reciprocity"
    }

    fn terminal_utility(
        &self,
        self_payoff: f64,
        opponent_payoff: f64,
        context: &TerminalContext<'_>,
    ) -> f64 {
        let player = context.player;
        let ahead = if self_payoff > opponent_payoff { 1.0 } else { 0.0 };
        let behind = if opponent_payoff > self_payoff { 1.0 } else { 0.0 };
        let weight = self.rho[player] * ahead
            + self.sigma[player] * behind
            + self.reciprocal_term(context);
        (1.0 - weight) * self_payoff + weight * opponent_payoff
    }

    fn parameters(&self) -> Vec<(String, f64)> {
        let mut named = Vec::with_capacity(5);
        for player in Player::BOTH {
            named.push((format!("rho_{}", player.label()), self.rho[player]));
        }
        for player in Player::BOTH {
            named.push((format!("sigma_{}", player.label()), self.sigma[player]));
        }
        named.push((format!("theta_{}", Self::PUNISHER.label()), self.theta));
        named
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::{Decision, Game, sharing_game},
        identifiers::StateId,
    };

    /// Out at (10, 15) is best jointly and best for player 2.
    fn rational_punish_a() -> Game {
        let config = sharing_game((10.0, 15.0), (3.0, 5.0), (10.0, 3.0));
        Game::from_config("rational_punish_A", &config).unwrap()
    }

    fn path_to(game: &Game, terminal: u32) -> Vec<Decision> {
        game.history(game.index_of(StateId::new(terminal)).unwrap())
    }

    #[test]
    fn test_advantage_weights() {
        let game = rational_punish_a();
        let left = game.index_of(StateId::new(4)).unwrap();
        let path = path_to(&game, 4);
        let preference = Reciprocity::new(PerPlayer::new(0.4, 0.3), PerPlayer::new(0.2, 0.1), 0.0);

        // player 2 ahead 5 vs 3: ρ2 = 0.3
        let context = TerminalContext::new(&game, Player::Two, left, &path);
        let utility = preference.terminal_utility(5.0, 3.0, &context);
        assert!((utility - (0.7 * 5.0 + 0.3 * 3.0)).abs() < 1e-12);

        // player 1 behind 3 vs 5: σ1 = 0.2
        let context = TerminalContext::new(&game, Player::One, left, &path);
        let utility = preference.terminal_utility(3.0, 5.0, &context);
        assert!((utility - (0.8 * 3.0 + 0.2 * 5.0)).abs() < 1e-12);
    }

    #[test]
    fn test_punishment_applies_to_player_two_after_forgone_out() {
        let game = rational_punish_a();
        let right = game.index_of(StateId::new(5)).unwrap();
        let path = path_to(&game, 5);
        let preference = Reciprocity::new(PerPlayer::splat(0.0), PerPlayer::splat(0.0), 0.5);

        // w = −0.5: U = 1.5·3 − 0.5·10
        let context = TerminalContext::new(&game, Player::Two, right, &path);
        let utility = preference.terminal_utility(3.0, 10.0, &context);
        assert!((utility - (1.5 * 3.0 - 0.5 * 10.0)).abs() < 1e-12);

        // θ never touches player 1
        let context = TerminalContext::new(&game, Player::One, right, &path);
        assert_eq!(preference.terminal_utility(10.0, 3.0, &context), 10.0);
    }

    #[test]
    fn test_punishment_depends_on_forgone_outcome() {
        let config = sharing_game((5.0, 10.0), (3.0, 5.0), (10.0, 3.0));
        let game = Game::from_config("rational_punish", &config).unwrap();
        let right = game.index_of(StateId::new(5)).unwrap();
        let path = path_to(&game, 5);
        let preference = Reciprocity::new(PerPlayer::splat(0.0), PerPlayer::splat(0.0), 0.9);
        let context = TerminalContext::new(&game, Player::Two, right, &path);
        // Out joint 15 is the max, player 2's max is 10 at Out as well
        assert!(context.opponent_forwent_cooperation());

        let config = sharing_game((5.0, 5.0), (10.0, 10.0), (0.0, 0.0));
        let game = Game::from_config("common_interest", &config).unwrap();
        let right = game.index_of(StateId::new(5)).unwrap();
        let path = path_to(&game, 5);
        let context = TerminalContext::new(&game, Player::Two, right, &path);
        assert_eq!(preference.terminal_utility(0.0, 0.0, &context), 0.0);
        assert!(!context.opponent_forwent_cooperation());
    }

    #[test]
    fn test_neutral_matches_own_payoff() {
        let game = rational_punish_a();
        let preference = Reciprocity::neutral();
        for terminal in game.terminal_states() {
            let path = game.history(terminal);
            for player in Player::BOTH {
                let context = TerminalContext::new(&game, player, terminal, &path);
                let own = game.payoff(terminal, player);
                let other = game.payoff(terminal, player.opponent());
                assert_eq!(preference.terminal_utility(own, other, &context), own);
            }
        }
    }

    #[test]
    fn test_parameter_names() {
        let names: Vec<String> = Reciprocity::neutral()
            .parameters()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec![
                "rho_player1",
                "rho_player2",
                "sigma_player1",
                "sigma_player2",
                "theta_player2"
            ]
        );
    }
}
