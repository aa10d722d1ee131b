//! Held-out predictions and their agreement with human data

use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::power::PowerMetrics;
use crate::{
    Error, Result,
    config::SolverConfig,
    fitting::{FitResult, HumanData, ModelInstance, ModelKind, PivotalDecisions, pivotal_from_profile},
    game::{Game, PerPlayer, Player},
    solver::LevelKSolver,
};

/// z-value of a two-sided 95% interval.
pub const Z_95: f64 = 1.96;

/// Model prediction for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePrediction {
    pub game: String,
    pub model: ModelKind,
    /// Predicted probability of each player's pivotal action
    pub pivotal: PerPlayer<Option<f64>>,
    pub power: PowerMetrics,
}

/// Drive the solver with fitted parameters over `games`.
pub fn predict(
    fit: &FitResult,
    games: &[Game],
    solver: &SolverConfig,
    pivotal: &PivotalDecisions,
) -> Result<Vec<GamePrediction>> {
    let model = fit.instantiate()?;
    games
        .iter()
        .map(|game| predict_game(fit.model, &model, game, solver, pivotal))
        .collect()
}

fn predict_game(
    kind: ModelKind,
    model: &ModelInstance,
    game: &Game,
    solver: &SolverConfig,
    pivotal: &PivotalDecisions,
) -> Result<GamePrediction> {
    let profile = LevelKSolver::new(game, model.preference.as_ref(), model.betas)?
        .with_max_ply(solver.max_ply)
        .profile(solver.level);
    Ok(GamePrediction {
        game: game.name().to_string(),
        model: kind,
        pivotal: pivotal_from_profile(game, &profile, pivotal),
        power: PowerMetrics::compute(game, &profile),
    })
}

/// Agreement between predicted and observed probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub n: usize,
    /// Pearson correlation; `None` when either side has zero variance
    pub pearson_r: Option<f64>,
    /// `1 − SS_res / SS_tot`; `None` when observations have zero variance
    pub r_squared: Option<f64>,
    /// `1 − (1 − R²)(n − 1)/(n − 2)`; needs at least three points
    pub adjusted_r_squared: Option<f64>,
    pub mse: f64,
}

impl Agreement {
    /// Compare paired values. `None` when fewer than two pairs remain.
    pub fn compute(predicted: &[f64], observed: &[f64]) -> Option<Self> {
        let n = predicted.len().min(observed.len());
        if n < 2 {
            return None;
        }
        let (predicted, observed) = (&predicted[..n], &observed[..n]);

        let sd_predicted = predicted.std_dev();
        let sd_observed = observed.std_dev();
        let pearson_r = (sd_predicted > 0.0 && sd_observed > 0.0)
            .then(|| predicted.covariance(observed) / (sd_predicted * sd_observed));

        let mean_observed = observed.mean();
        let ss_res: f64 = predicted
            .iter()
            .zip(observed)
            .map(|(p, o)| (o - p).powi(2))
            .sum();
        let ss_tot: f64 = observed.iter().map(|o| (o - mean_observed).powi(2)).sum();
        let r_squared = (ss_tot > 0.0).then(|| 1.0 - ss_res / ss_tot);
        let adjusted_r_squared = r_squared
            .filter(|_| n > 2)
            .map(|r2| 1.0 - (1.0 - r2) * (n as f64 - 1.0) / (n as f64 - 2.0));

        Some(Self {
            n,
            pearson_r,
            r_squared,
            adjusted_r_squared,
            mse: ss_res / n as f64,
        })
    }
}

/// Half-width of the 95% confidence interval of a mean.
pub fn confidence_half_width(sd: f64, participants: usize) -> f64 {
    if participants == 0 {
        return 0.0;
    }
    Z_95 * sd / (participants as f64).sqrt()
}

/// Predictions compared with human data, per player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub model: ModelKind,
    /// Games with both a prediction and an observation
    pub games: Vec<String>,
    pub agreement: PerPlayer<Option<Agreement>>,
}

impl Evaluation {
    /// Pair predictions with observations by game name. Games missing from
    /// `data` or lacking a prediction for a player are left out of that
    /// player's comparison.
    pub fn compute(predictions: &[GamePrediction], data: &HumanData) -> Result<Self> {
        let model = predictions
            .first()
            .map(|p| p.model)
            .ok_or(Error::NoUsableGames { battery_size: 0 })?;

        let matched: Vec<_> = predictions
            .iter()
            .filter_map(|prediction| {
                data.get(&prediction.game)
                    .map(|target| (prediction, target))
            })
            .collect();

        let agreement = PerPlayer::from_fn(|player: Player| {
            let (predicted, observed): (Vec<f64>, Vec<f64>) = matched
                .iter()
                .filter_map(|(prediction, target)| {
                    prediction.pivotal[player].map(|p| (p, target.mean[player]))
                })
                .unzip();
            Agreement::compute(&predicted, &observed)
        });

        Ok(Self {
            model,
            games: matched.iter().map(|(p, _)| p.game.clone()).collect(),
            agreement,
        })
    }
}

#[derive(Debug, Serialize)]
struct PredictionRow<'a> {
    #[serde(rename = "Game")]
    game: &'a str,
    #[serde(rename = "Model")]
    model: &'a str,
    p_in: Option<f64>,
    p_right: Option<f64>,
    reu: f64,
    rcr: f64,
}

/// Write predictions as CSV (`Game, Model, p_in, p_right, reu, rcr`).
pub fn write_predictions(path: &Path, predictions: &[GamePrediction]) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::Io {
        operation: format!("create predictions {path:?}"),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);
    for prediction in predictions {
        writer.serialize(PredictionRow {
            game: &prediction.game,
            model: prediction.model.name(),
            p_in: prediction.pivotal[Player::One],
            p_right: prediction.pivotal[Player::Two],
            reu: prediction.power.reu,
            rcr: prediction.power.rcr,
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fitting::pivotal_probabilities, game::sharing_game};

    #[test]
    fn test_perfect_agreement() {
        let values = [0.1, 0.4, 0.8, 0.9];
        let agreement = Agreement::compute(&values, &values).unwrap();
        assert!((agreement.pearson_r.unwrap() - 1.0).abs() < 1e-12);
        assert!((agreement.r_squared.unwrap() - 1.0).abs() < 1e-12);
        assert!((agreement.adjusted_r_squared.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(agreement.mse, 0.0);
    }

    #[test]
    fn test_agreement_by_hand() {
        let predicted = [0.2, 0.5, 0.6];
        let observed = [0.3, 0.4, 0.8];
        let agreement = Agreement::compute(&predicted, &observed).unwrap();

        let mse = (0.01 + 0.01 + 0.04) / 3.0;
        assert!((agreement.mse - mse).abs() < 1e-12);

        // observed mean 0.5
        let ss_tot = 0.04 + 0.01 + 0.09;
        let r2 = 1.0 - 0.06 / ss_tot;
        assert!((agreement.r_squared.unwrap() - r2).abs() < 1e-12);
        assert!((agreement.adjusted_r_squared.unwrap() - (1.0 - (1.0 - r2) * 2.0)).abs() < 1e-12);

        let r = agreement.pearson_r.unwrap();
        assert!(r > 0.0 && r < 1.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(Agreement::compute(&[0.5], &[0.5]).is_none());
        let flat = Agreement::compute(&[0.5, 0.5], &[0.2, 0.4]).unwrap();
        assert!(flat.pearson_r.is_none());
        assert!(flat.adjusted_r_squared.is_none());
    }

    #[test]
    fn test_prediction_matches_objective_probabilities() {
        let game = Game::from_config(
            "rational_punish_A",
            &sharing_game((10.0, 15.0), (3.0, 5.0), (10.0, 3.0)),
        )
        .unwrap();
        let model = ModelKind::Reciprocity
            .instantiate(&[0.8, 1.3, 0.1, 0.2, 0.3, 0.1, 0.4])
            .unwrap();
        let solver = SolverConfig::default();
        let pivotal = PivotalDecisions::default();

        let prediction =
            predict_game(ModelKind::Reciprocity, &model, &game, &solver, &pivotal).unwrap();
        let expected = pivotal_probabilities(&game, &model, &solver, &pivotal).unwrap();
        assert_eq!(prediction.pivotal, expected);
        assert!(prediction.pivotal[Player::One].is_some());
        assert!(prediction.pivotal[Player::Two].is_some());
    }

    #[test]
    fn test_confidence_half_width() {
        assert!((confidence_half_width(0.3, 42) - 1.96 * 0.3 / 42f64.sqrt()).abs() < 1e-12);
        assert_eq!(confidence_half_width(0.3, 0), 0.0);
    }
}
