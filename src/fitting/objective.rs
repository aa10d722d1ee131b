//! Negative log-likelihood of human choices under a model

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    human_data::{HumanData, HumanTarget},
    model::{ModelInstance, ModelKind},
};
use crate::{
    Error, Result,
    config::SolverConfig,
    game::{Game, PerPlayer, Player},
    identifiers::{ActionId, StateId},
    solver::{LevelKSolver, PolicyProfile},
};

/// Probabilities are clamped to `[PROBABILITY_FLOOR, 1 − PROBABILITY_FLOOR]`
/// before taking logarithms.
pub const PROBABILITY_FLOOR: f64 = 1e-9;

/// A labelled action whose predicted probability is compared with data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotalDecision {
    pub state: StateId,
    pub action: ActionId,
}

impl PivotalDecision {
    pub fn new(state: u32, action: impl Into<ActionId>) -> Self {
        Self {
            state: StateId::new(state),
            action: action.into(),
        }
    }
}

/// One pivotal decision per player.
///
/// Defaults to player 1 choosing `In` at state 1 and player 2 choosing
/// `Right` at state 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotalDecisions {
    pub decisions: PerPlayer<PivotalDecision>,
}

impl PivotalDecisions {
    pub fn new(one: PivotalDecision, two: PivotalDecision) -> Self {
        Self {
            decisions: PerPlayer::new(one, two),
        }
    }

    pub fn get(&self, player: Player) -> &PivotalDecision {
        &self.decisions[player]
    }
}

impl Default for PivotalDecisions {
    fn default() -> Self {
        Self::new(
            PivotalDecision::new(1, "In"),
            PivotalDecision::new(3, "Right"),
        )
    }
}

/// Predicted probability of each player's pivotal action.
///
/// `None` for a player whose pivotal action does not appear in the policy.
pub fn pivotal_probabilities(
    game: &Game,
    model: &ModelInstance,
    solver: &SolverConfig,
    pivotal: &PivotalDecisions,
) -> Result<PerPlayer<Option<f64>>> {
    let profile = LevelKSolver::new(game, model.preference.as_ref(), model.betas)?
        .with_max_ply(solver.max_ply)
        .profile(solver.level);
    Ok(pivotal_from_profile(game, &profile, pivotal))
}

/// Pivotal probabilities read from an already solved profile.
pub fn pivotal_from_profile(
    game: &Game,
    profile: &PolicyProfile,
    pivotal: &PivotalDecisions,
) -> PerPlayer<Option<f64>> {
    PerPlayer::from_fn(|player| {
        let decision = pivotal.get(player);
        profile
            .policy(player)
            .probability_of(game, decision.state, decision.action.as_str())
    })
}

/// Bernoulli negative log-likelihood of observing frequency `target` when
/// the model predicts `predicted`.
pub fn bernoulli_nll(predicted: f64, target: f64) -> f64 {
    let p = predicted.clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR);
    -(target * p.ln() + (1.0 - target) * (1.0 - p).ln())
}

/// Summed NLL of one model over a battery, as a function of the parameter
/// vector.
///
/// Games without human data are dropped at construction. Every evaluation
/// builds fresh solvers, so evaluations are independent of each other.
#[derive(Debug)]
pub struct Objective<'a> {
    model: ModelKind,
    games: Vec<(&'a Game, HumanTarget)>,
    skipped: Vec<String>,
    solver: SolverConfig,
    pivotal: PivotalDecisions,
}

impl<'a> Objective<'a> {
    /// # Errors
    ///
    /// Returns [`Error::NoUsableGames`] if no game in `games` has a target in
    /// `data`.
    pub fn new(
        model: ModelKind,
        games: &'a [Game],
        data: &HumanData,
        solver: SolverConfig,
        pivotal: PivotalDecisions,
    ) -> Result<Self> {
        let mut usable = Vec::with_capacity(games.len());
        let mut skipped = Vec::new();
        for game in games {
            match data.target(game.name()) {
                Ok(target) => usable.push((game, *target)),
                Err(Error::DataMismatch { game: name }) => {
                    debug!("skipping game '{name}': no human data");
                    skipped.push(name);
                }
                Err(other) => return Err(other),
            }
        }

        if usable.is_empty() {
            return Err(Error::NoUsableGames {
                battery_size: games.len(),
            });
        }

        Ok(Self {
            model,
            games: usable,
            skipped,
            solver,
            pivotal,
        })
    }

    pub fn model(&self) -> ModelKind {
        self.model
    }

    /// Number of games contributing to the objective.
    pub fn games_used(&self) -> usize {
        self.games.len()
    }

    /// Names of games dropped for lack of human data.
    pub fn skipped_games(&self) -> &[String] {
        &self.skipped
    }

    /// Objective value, or `+∞` when `x` cannot drive a solver.
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        self.try_evaluate(x).unwrap_or(f64::INFINITY)
    }

    pub fn try_evaluate(&self, x: &[f64]) -> Result<f64> {
        let model = self.model.instantiate(x)?;
        let mut total = 0.0;
        for (game, target) in &self.games {
            let predicted = pivotal_probabilities(game, &model, &self.solver, &self.pivotal)?;
            for player in Player::BOTH {
                let p = predicted[player].unwrap_or(PROBABILITY_FLOOR);
                total += bernoulli_nll(p, target.mean[player]);
            }
        }
        Ok(total)
    }
}
