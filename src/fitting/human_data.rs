//! Observed human choice frequencies

use std::{collections::BTreeMap, io::Read, path::Path};

use serde::Deserialize;

use crate::{
    Error, Result,
    game::{PerPlayer, Player},
};

/// Observed probabilities of the two pivotal decisions in one game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumanTarget {
    /// Mean probability per player (player 1 enters, player 2 picks the
    /// competing option)
    pub mean: PerPlayer<f64>,
    /// Standard deviation across participants, when reported
    pub sd: PerPlayer<Option<f64>>,
}

impl HumanTarget {
    pub fn new(p1: f64, p2: f64) -> Self {
        Self {
            mean: PerPlayer::new(p1, p2),
            sd: PerPlayer::splat(None),
        }
    }

    pub fn with_sd(mut self, sd1: f64, sd2: f64) -> Self {
        self.sd = PerPlayer::new(Some(sd1), Some(sd2));
        self
    }
}

/// Human targets keyed by game name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HumanData {
    targets: BTreeMap<String, HumanTarget>,
}

#[derive(Debug, Deserialize)]
struct SummaryRow {
    #[serde(rename = "Game")]
    game: String,
    #[serde(rename = "Mean_P1_Expectation")]
    mean_p1: f64,
    #[serde(rename = "SD_P1_Expectation", default)]
    sd_p1: Option<f64>,
    #[serde(rename = "Mean_P2_Expectation")]
    mean_p2: f64,
    #[serde(rename = "SD_P2_Expectation", default)]
    sd_p2: Option<f64>,
}

impl HumanData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the target for `game`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHumanData`] if a mean lies outside `[0, 1]` or
    /// a standard deviation is negative.
    pub fn insert(&mut self, game: impl Into<String>, target: HumanTarget) -> Result<()> {
        let game = game.into();
        for (player, &mean) in target.mean.iter() {
            if !(0.0..=1.0).contains(&mean) {
                return Err(Error::InvalidHumanData {
                    game,
                    reason: format!("player {player} probability {mean} is outside [0, 1]"),
                });
            }
        }
        for (player, sd) in target.sd.iter() {
            if let Some(sd) = sd.filter(|sd| !(sd.is_finite() && *sd >= 0.0)) {
                return Err(Error::InvalidHumanData {
                    game,
                    reason: format!("player {player} standard deviation {sd} is invalid"),
                });
            }
        }
        self.targets.insert(game, target);
        Ok(())
    }

    /// Target for `game`, or [`Error::DataMismatch`] when none was observed.
    pub fn target(&self, game: &str) -> Result<&HumanTarget> {
        self.targets.get(game).ok_or_else(|| Error::DataMismatch {
            game: game.to_string(),
        })
    }

    pub fn get(&self, game: &str) -> Option<&HumanTarget> {
        self.targets.get(game)
    }

    pub fn contains(&self, game: &str) -> bool {
        self.targets.contains_key(game)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HumanTarget)> {
        self.targets.iter().map(|(name, target)| (name.as_str(), target))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Read summary statistics in CSV form.
    ///
    /// Required columns are `Game`, `Mean_P1_Expectation` and
    /// `Mean_P2_Expectation`; `SD_P1_Expectation` and `SD_P2_Expectation`
    /// are optional. Extra columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut data = Self::new();
        for row in csv.deserialize::<SummaryRow>() {
            let row = row?;
            let mut target = HumanTarget::new(row.mean_p1, row.mean_p2);
            target.sd = PerPlayer::new(row.sd_p1, row.sd_p2);
            data.insert(row.game, target)?;
        }
        Ok(data)
    }

    /// Load summary statistics from a CSV file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: format!("open human data {path:?}"),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Mean observed probabilities for one player, in game-name order.
    pub fn means(&self, player: Player) -> Vec<f64> {
        self.targets.values().map(|t| t.mean[player]).collect()
    }
}

impl FromIterator<(String, HumanTarget)> for HumanData {
    /// Collects without validation; prefer [`HumanData::insert`] for
    /// untrusted values.
    fn from_iter<I: IntoIterator<Item = (String, HumanTarget)>>(iter: I) -> Self {
        Self {
            targets: iter.into_iter().collect(),
        }
    }
}
