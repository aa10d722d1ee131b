//! Power metrics derived from predicted play
//!
//! Expected utilities come from the outcome distribution induced by a policy
//! profile. From them:
//!
//! - REU (relative expected utility) = `EU₂ − EU₁`
//! - control of player P = `|max₋P − EU₋P| / |max₋P|`, the shortfall P imposes
//!   on the opponent relative to the opponent's best payoff
//! - RCR (relative control over resources) = `control₂ − control₁`

use serde::{Deserialize, Serialize};

use crate::{
    game::{Game, PerPlayer, Player},
    identifiers::StateIndex,
    solver::PolicyProfile,
};

/// Power metrics of one game under one policy profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerMetrics {
    pub expected_utility: PerPlayer<f64>,
    /// `EU₂ − EU₁`
    pub reu: f64,
    pub control: PerPlayer<f64>,
    /// `control₂ − control₁`
    pub rcr: f64,
}

impl PowerMetrics {
    pub fn compute(game: &Game, profile: &PolicyProfile) -> Self {
        let expected_utility = expected_utilities(game, profile);
        let best = game.payoff_summary().max_payoff;

        let control = PerPlayer::from_fn(|player| {
            let other = player.opponent();
            shortfall(best[other], expected_utility[other])
        });

        Self {
            expected_utility,
            reu: expected_utility[Player::Two] - expected_utility[Player::One],
            control,
            rcr: control[Player::Two] - control[Player::One],
        }
    }
}

/// `|max − eu| / |max|`, or 0 when `max` is 0.
///
/// Normalizing by the magnitude keeps control non-negative when every
/// payoff of the opponent is a loss.
fn shortfall(max: f64, eu: f64) -> f64 {
    if max == 0.0 {
        0.0
    } else {
        (max - eu).abs() / max.abs()
    }
}

/// Probability of reaching each terminal state when both players follow
/// `profile`. Actions without a policy entry are taken uniformly.
///
/// Paths longer than the number of states are cut, so cyclic games leak
/// probability mass instead of looping.
pub fn outcome_distribution(game: &Game, profile: &PolicyProfile) -> Vec<(StateIndex, f64)> {
    fn walk(
        game: &Game,
        profile: &PolicyProfile,
        state: StateIndex,
        mass: f64,
        budget: usize,
        out: &mut Vec<(StateIndex, f64)>,
    ) {
        let Some(mover) = game.mover(state) else {
            match out.iter_mut().find(|(s, _)| *s == state) {
                Some((_, total)) => *total += mass,
                None => out.push((state, mass)),
            }
            return;
        };
        if budget == 0 || mass == 0.0 {
            return;
        }
        let actions = game.available(state);
        let policy = profile.policy(mover).distribution(state);
        for (position, action) in actions.iter().enumerate() {
            let p = match policy {
                Some(dist) => dist.get(position).copied().unwrap_or(0.0),
                None => 1.0 / actions.len() as f64,
            };
            walk(game, profile, action.target, mass * p, budget - 1, out);
        }
    }

    let mut out = Vec::new();
    walk(
        game,
        profile,
        game.initial_state(),
        1.0,
        game.state_count(),
        &mut out,
    );
    out
}

/// Expected payoff of each player under `profile`.
pub fn expected_utilities(game: &Game, profile: &PolicyProfile) -> PerPlayer<f64> {
    outcome_distribution(game, profile)
        .into_iter()
        .fold(PerPlayer::splat(0.0), |mut eu, (state, p)| {
            for player in Player::BOTH {
                eu[player] += p * game.payoff(state, player);
            }
            eu
        })
}
