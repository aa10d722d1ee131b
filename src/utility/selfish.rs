use serde::{Deserialize, Serialize};

use super::{SocialPreference, TerminalContext};

/// Purely self-interested utility: `U = self_payoff`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Selfish;

impl SocialPreference for Selfish {
    fn name(&self) -> &'static str {
        "selfish"
    }

    fn terminal_utility(
        &self,
        self_payoff: f64,
        _opponent_payoff: f64,
        _context: &TerminalContext<'_>,
    ) -> f64 {
        self_payoff
    }

    fn parameters(&self) -> Vec<(String, f64)> {
        Vec::new()
    }
}
