//! Fehr–Schmidt style inequality aversion

use serde::{Deserialize, Serialize};

use super::{SocialPreference, TerminalContext};
use crate::game::{PerPlayer, Player};

/// Utility reduced by payoff gaps in either direction.
///
/// `U = own − δ·max(other − own, 0) − α·max(own − other, 0)`, where δ weighs
/// disadvantageous inequality (envy) and α advantageous inequality (guilt).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InequalityAversion {
    pub delta: PerPlayer<f64>,
    pub alpha: PerPlayer<f64>,
}

impl InequalityAversion {
    pub fn new(delta: PerPlayer<f64>, alpha: PerPlayer<f64>) -> Self {
        Self { delta, alpha }
    }

    /// Both weights zero for both players; equivalent to [`Selfish`](super::Selfish).
    pub fn neutral() -> Self {
        Self::new(PerPlayer::splat(0.0), PerPlayer::splat(0.0))
    }
}

impl SocialPreference for InequalityAversion {
    fn name(&self) -> &'static str {
        "inequality"
    }

    fn terminal_utility(
        &self,
        self_payoff: f64,
        opponent_payoff: f64,
        context: &TerminalContext<'_>,
    ) -> f64 {
        let player = context.player;
        let envy = (opponent_payoff - self_payoff).max(0.0);
        let guilt = (self_payoff - opponent_payoff).max(0.0);
        self_payoff - self.delta[player] * envy - self.alpha[player] * guilt
    }

    fn parameters(&self) -> Vec<(String, f64)> {
        let mut named = Vec::with_capacity(4);
        for player in Player::BOTH {
            named.push((format!("delta_{}", player.label()), self.delta[player]));
        }
        for player in Player::BOTH {
            named.push((format!("alpha_{}", player.label()), self.alpha[player]));
        }
        named
    }
}
