//! Maximum-likelihood fits and their persisted form

use std::{
    collections::BTreeMap,
    fmt,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use log::{info, warn};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{
    human_data::HumanData,
    model::{ModelInstance, ModelKind},
    objective::Objective,
    optimizer::{Minimum, ProjectedGradient, Status},
};
use crate::{Error, Result, config::FitConfig, game::Game};

/// The optimizer stopped before meeting its tolerance.
///
/// Not an error: the best iterate is still reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceWarning {
    pub model: ModelKind,
    pub status: Status,
    pub objective: f64,
    pub iterations: usize,
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fit did not converge ({}) after {} iterations; best NLL {:.4}",
            self.model, self.status, self.iterations, self.objective
        )
    }
}

/// Fitted parameters of one model over one battery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub model: ModelKind,
    /// Parameter name → fitted value
    pub parameters: BTreeMap<String, f64>,
    /// Summed negative log-likelihood at the fitted point
    pub objective: f64,
    pub status: Status,
    pub iterations: usize,
    pub games_used: usize,
    #[serde(default)]
    pub skipped_games: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<ConvergenceWarning>,
}

impl FitResult {
    /// Parameter vector in the model's canonical order.
    pub fn vector(&self) -> Result<Vec<f64>> {
        self.model.vector_from(&self.parameters, None)
    }

    /// Preference and inverse temperatures described by this fit.
    pub fn instantiate(&self) -> Result<ModelInstance> {
        self.model.instantiate(&self.vector()?)
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }
}

/// Fit one model to human data over a battery.
///
/// Runs the minimizer from the model's initial guess and from
/// `config.restarts` additional random points, and keeps the best final
/// iterate. Games without human data are skipped and listed in the result.
///
/// # Errors
///
/// Returns [`Error::NoUsableGames`] if no game has human data.
pub fn fit(
    model: ModelKind,
    games: &[Game],
    data: &HumanData,
    config: &FitConfig,
) -> Result<FitResult> {
    let objective = Objective::new(model, games, data, config.solver(), config.pivotal.clone())?;
    let space = model.space();
    let optimizer = ProjectedGradient::new(
        config.max_iterations,
        config.tolerance,
        config.gradient_step,
    );

    info!(
        "fitting {model} on {} games ({} skipped, {} restarts)",
        objective.games_used(),
        objective.skipped_games().len(),
        config.restarts
    );

    let mut starts = vec![space.initial.clone()];
    if config.restarts > 0 {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random::<u64>()),
        };
        starts.extend((0..config.restarts).map(|_| space.sample(&mut rng)));
    }

    let mut best: Option<Minimum> = None;
    for (i, start) in starts.iter().enumerate() {
        let minimum = optimizer.minimize(|x| objective.evaluate(x), &space, start);
        info!(
            "{model} start {i}: NLL {:.6} ({}, {} iterations)",
            minimum.value, minimum.status, minimum.iterations
        );
        if best.as_ref().is_none_or(|b| minimum.value < b.value) {
            best = Some(minimum);
        }
    }

    let best = best.ok_or_else(|| Error::InvalidParameter {
        name: model.name().to_string(),
        reason: "no starting point".to_string(),
    })?;

    let warning = (!best.status.is_converged()).then(|| ConvergenceWarning {
        model,
        status: best.status,
        objective: best.value,
        iterations: best.iterations,
    });
    if let Some(warning) = &warning {
        warn!("{warning}");
    }

    Ok(FitResult {
        model,
        parameters: space.named(&best.x),
        objective: best.value,
        status: best.status,
        iterations: best.iterations,
        games_used: objective.games_used(),
        skipped_games: objective.skipped_games().to_vec(),
        warning,
    })
}

/// Latest fit per model, saved as one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FitSet {
    fits: BTreeMap<ModelKind, FitResult>,
}

impl FitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fit, replacing any earlier fit of the same model.
    pub fn insert(&mut self, fit: FitResult) {
        self.fits.insert(fit.model, fit);
    }

    pub fn get(&self, model: ModelKind) -> Option<&FitResult> {
        self.fits.get(&model)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FitResult> {
        self.fits.values()
    }

    pub fn len(&self) -> usize {
        self.fits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open fits {path:?}"),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create fits {path:?}"),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

impl FromIterator<FitResult> for FitSet {
    fn from_iter<I: IntoIterator<Item = FitResult>>(iter: I) -> Self {
        let mut set = FitSet::new();
        for fit in iter {
            set.insert(fit);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        fitting::HumanTarget,
        game::{Battery, sharing_game},
    };

    fn symmetric_game() -> Vec<Game> {
        let config = sharing_game((5.0, 5.0), (7.0, 7.0), (7.0, 7.0));
        vec![Game::from_config("strategic_dummy", &config).unwrap()]
    }

    #[test]
    fn test_selfish_fit_improves_on_initial_guess() {
        let games = symmetric_game();
        let mut data = HumanData::new();
        data.insert("strategic_dummy", HumanTarget::new(0.7, 0.5))
            .unwrap();
        let config = FitConfig::default().with_max_iterations(100);

        let objective = Objective::new(
            ModelKind::Selfish,
            &games,
            &data,
            config.solver(),
            config.pivotal.clone(),
        )
        .unwrap();
        let initial = objective.evaluate(&ModelKind::Selfish.space().initial);

        let result = fit(ModelKind::Selfish, &games, &data, &config).unwrap();
        assert!(result.objective < initial);
        assert!(result.iterations >= 1);
        assert_eq!(result.games_used, 1);

        // p(In) = 1 / (1 + e^{-2β1}) = 0.7 at the optimum
        let beta1 = result.parameter("beta_player1").unwrap();
        let target = 0.5 * (0.7f64 / 0.3).ln();
        assert!((beta1 - target).abs() < 1e-2, "beta1 = {beta1}");
    }

    #[test]
    fn test_inequality_fit_respects_dominance() {
        let games = Battery::builtin("exp1").unwrap().build().unwrap();
        let mut data = HumanData::new();
        data.insert("costly_punish", HumanTarget::new(0.4, 0.6))
            .unwrap();
        data.insert("free_help", HumanTarget::new(0.8, 0.1)).unwrap();
        let config = FitConfig::default().with_max_iterations(25);

        let result = fit(ModelKind::Inequality, &games, &data, &config).unwrap();
        for player in ["player1", "player2"] {
            let delta = result.parameter(&format!("delta_{player}")).unwrap();
            let alpha = result.parameter(&format!("alpha_{player}")).unwrap();
            assert!(delta >= alpha, "{delta} < {alpha}");
        }
        assert_eq!(result.skipped_games.len(), games.len() - 2);
        assert!(result.skipped_games.contains(&"trust_game".to_string()));
    }

    #[test]
    fn test_seeded_restarts_are_reproducible() {
        let games = symmetric_game();
        let mut data = HumanData::new();
        data.insert("strategic_dummy", HumanTarget::new(0.6, 0.5))
            .unwrap();
        let config = FitConfig::default()
            .with_max_iterations(20)
            .with_restarts(2)
            .with_seed(11);
        let first = fit(ModelKind::Selfish, &games, &data, &config).unwrap();
        let second = fit(ModelKind::Selfish, &games, &data, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fit_set_file_roundtrip() {
        let games = symmetric_game();
        let mut data = HumanData::new();
        data.insert("strategic_dummy", HumanTarget::new(0.6, 0.5))
            .unwrap();
        let config = FitConfig::default().with_max_iterations(10);
        let fits: FitSet = [fit(ModelKind::Selfish, &games, &data, &config).unwrap()]
            .into_iter()
            .collect();

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("fits.json");
        fits.save(&path).expect("Failed to save");
        let loaded = FitSet::load(&path).expect("Failed to load");
        assert_eq!(loaded.len(), 1);

        let original = fits.get(ModelKind::Selfish).unwrap();
        let selfish = loaded.get(ModelKind::Selfish).unwrap();
        assert_eq!(selfish.status, original.status);
        assert_eq!(selfish.iterations, original.iterations);
        assert!((selfish.objective - original.objective).abs() < 1e-12);
        for (name, value) in &original.parameters {
            assert!((selfish.parameters[name] - value).abs() < 1e-12);
        }

        let model = selfish.instantiate().unwrap();
        assert_eq!(
            model.betas[crate::game::Player::One],
            selfish.parameters["beta_player1"]
        );
    }
}
