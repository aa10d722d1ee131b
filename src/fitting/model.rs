//! Fittable model variants and their parameter spaces

use std::{collections::BTreeMap, fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    game::{PerPlayer, Player},
    utility::{InequalityAversion, Reciprocity, Selfish, SocialPreference},
};

/// Which social preference a parameter vector describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Selfish,
    Inequality,
    Reciprocity,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::Selfish,
        ModelKind::Inequality,
        ModelKind::Reciprocity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Selfish => "selfish",
            ModelKind::Inequality => "inequality",
            ModelKind::Reciprocity => "reciprocity",
        }
    }

    /// Parameter names in vector order, inverse temperatures first.
    pub fn parameter_names(self) -> Vec<String> {
        let betas = Player::BOTH
            .into_iter()
            .map(|player| format!("beta_{}", player.label()));
        let weights = match self {
            ModelKind::Selfish => Selfish.parameters(),
            ModelKind::Inequality => InequalityAversion::neutral().parameters(),
            ModelKind::Reciprocity => Reciprocity::neutral().parameters(),
        };
        betas.chain(weights.into_iter().map(|(name, _)| name)).collect()
    }

    /// Bounds, starting point and linear constraints for fitting.
    pub fn space(self) -> ParameterSpace {
        let names = self.parameter_names();
        match self {
            ModelKind::Selfish => ParameterSpace {
                names,
                lower: vec![0.01; 2],
                upper: vec![10.0; 2],
                initial: vec![0.5, 1.0],
                dominance: Vec::new(),
            },
            ModelKind::Inequality => ParameterSpace {
                names,
                lower: vec![0.01, 0.01, 0.0, 0.0, 0.0, 0.0],
                upper: vec![100.0; 6],
                initial: vec![0.5, 0.5, 1.0, 1.0, 0.5, 0.5],
                // δ_i ≥ α_i
                dominance: vec![(2, 4), (3, 5)],
            },
            ModelKind::Reciprocity => ParameterSpace {
                names,
                lower: vec![0.01, 0.01, 0.0, 0.0, 0.0, 0.0, 0.0],
                upper: vec![10.0, 10.0, 1.0, 1.0, 1.0, 1.0, 1.0],
                initial: vec![0.5, 1.0, 0.2, 0.2, 0.2, 0.2, 0.2],
                dominance: Vec::new(),
            },
        }
    }

    /// Instantiate the preference and inverse temperatures from a vector in
    /// [`parameter_names`](Self::parameter_names) order.
    pub fn instantiate(self, x: &[f64]) -> Result<ModelInstance> {
        let expected = self.parameter_names().len();
        if x.len() != expected {
            return Err(Error::InvalidParameter {
                name: self.name().to_string(),
                reason: format!("expected {expected} values, got {}", x.len()),
            });
        }

        let betas = PerPlayer::new(x[0], x[1]);
        let preference: Box<dyn SocialPreference> = match self {
            ModelKind::Selfish => Box::new(Selfish),
            ModelKind::Inequality => Box::new(InequalityAversion::new(
                PerPlayer::new(x[2], x[3]),
                PerPlayer::new(x[4], x[5]),
            )),
            ModelKind::Reciprocity => Box::new(Reciprocity::new(
                PerPlayer::new(x[2], x[3]),
                PerPlayer::new(x[4], x[5]),
                x[6],
            )),
        };
        Ok(ModelInstance { preference, betas })
    }

    /// Parameter vector from named values.
    ///
    /// Names absent from `named` fall back to `defaults` when given;
    /// otherwise they are an error, as are names this model does not use.
    pub fn vector_from(
        self,
        named: &BTreeMap<String, f64>,
        defaults: Option<&[f64]>,
    ) -> Result<Vec<f64>> {
        let names = self.parameter_names();
        if let Some(unknown) = named.keys().find(|key| !names.contains(key)) {
            return Err(Error::InvalidParameter {
                name: unknown.clone(),
                reason: format!(
                    "not a {} parameter (expected one of: {})",
                    self.name(),
                    names.join(", ")
                ),
            });
        }

        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                named
                    .get(name)
                    .copied()
                    .or_else(|| defaults.and_then(|d| d.get(i).copied()))
                    .ok_or_else(|| Error::InvalidParameter {
                        name: name.clone(),
                        reason: "missing value".to_string(),
                    })
            })
            .collect()
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "selfish" => Ok(ModelKind::Selfish),
            "inequality" | "inequality_aversion" | "ia" => Ok(ModelKind::Inequality),
            "reciprocity" | "recip" => Ok(ModelKind::Reciprocity),
            _ => Err(Error::UnknownModel {
                input: s.to_string(),
                expected: "selfish, inequality, reciprocity".to_string(),
            }),
        }
    }
}

/// A preference together with both players' inverse temperatures.
#[derive(Debug)]
pub struct ModelInstance {
    pub preference: Box<dyn SocialPreference>,
    pub betas: PerPlayer<f64>,
}

/// Feasible region of a model's parameter vector: a box intersected with
/// half-planes `x[greater] ≥ x[lesser]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpace {
    pub names: Vec<String>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub initial: Vec<f64>,
    /// `(greater, lesser)` index pairs; no index appears in two pairs
    pub dominance: Vec<(usize, usize)>,
}

impl ParameterSpace {
    pub fn dimension(&self) -> usize {
        self.names.len()
    }

    /// Projection onto the feasible set.
    ///
    /// Every violating pair is replaced by its midpoint, then all values are
    /// clamped into the box. This is the exact Euclidean projection when
    /// both members of each pair share the same bounds.
    pub fn project(&self, x: &mut [f64]) {
        for &(greater, lesser) in &self.dominance {
            if x[greater] < x[lesser] {
                let mid = 0.5 * (x[greater] + x[lesser]);
                x[greater] = mid;
                x[lesser] = mid;
            }
        }
        for ((value, &lo), &hi) in x.iter_mut().zip(&self.lower).zip(&self.upper) {
            *value = value.clamp(lo, hi);
        }
    }

    pub fn projected(&self, x: &[f64]) -> Vec<f64> {
        let mut y = x.to_vec();
        self.project(&mut y);
        y
    }

    /// True when `x` satisfies every bound and dominance constraint.
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dimension()
            && x
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(v, (lo, hi))| (*lo..=*hi).contains(v))
            && self.dominance.iter().all(|&(g, l)| x[g] >= x[l])
    }

    /// Uniform draw from the box, projected to feasibility.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let mut x: Vec<f64> = self
            .lower
            .iter()
            .zip(&self.upper)
            .map(|(&lo, &hi)| rng.random_range(lo..=hi))
            .collect();
        self.project(&mut x);
        x
    }

    /// Pair names with values.
    pub fn named(&self, x: &[f64]) -> BTreeMap<String, f64> {
        self.names.iter().cloned().zip(x.iter().copied()).collect()
    }
}
