//! Terminal-utility transforms (social preferences)
//!
//! Each preference turns a terminal payoff pair into the scalar utility a
//! player assigns to that outcome. The level-K solver is generic over this
//! seam, so the three theories share one tree walker.

pub mod context;
pub mod inequality;
pub mod reciprocity;
pub mod selfish;

use std::fmt;

pub use context::TerminalContext;
pub use inequality::InequalityAversion;
pub use reciprocity::Reciprocity;
pub use selfish::Selfish;

/// A social preference over terminal outcomes.
///
/// Implementations must be pure: the same payoffs and context always yield
/// the same utility, and no input may cause a division by zero.
pub trait SocialPreference: fmt::Debug + Send + Sync {
    /// Short name used in reports (`"selfish"`, `"inequality"`, ...).
    fn name(&self) -> &'static str;

    /// Utility of a terminal outcome for `context.player`.
    fn terminal_utility(
        &self,
        self_payoff: f64,
        opponent_payoff: f64,
        context: &TerminalContext<'_>,
    ) -> f64;

    /// Named behavioral weights, excluding inverse temperatures.
    fn parameters(&self) -> Vec<(String, f64)>;
}

impl<P: SocialPreference + ?Sized> SocialPreference for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn terminal_utility(
        &self,
        self_payoff: f64,
        opponent_payoff: f64,
        context: &TerminalContext<'_>,
    ) -> f64 {
        (**self).terminal_utility(self_payoff, opponent_payoff, context)
    }

    fn parameters(&self) -> Vec<(String, f64)> {
        (**self).parameters()
    }
}
