//! Linear regression model stored as JSON.
//!
//! Weights are keyed by feature name, so the dataset columns may appear in any
//! order as long as every named feature is present.

use std::path::{Path, PathBuf};

use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::estimator::{Estimator, EstimatorError};
use crate::dataset::Dataset;

/// Current on-disk format version.
pub const LINEAR_MODEL_VERSION: i64 = 1;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read model {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid model json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid model: {0}")]
    Invalid(String),
}

/// `prediction = intercept + sum(weight_i * feature_i)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearModel {
    pub model_version: i64,
    pub features: Vec<String>,
    pub weights: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    pub fn new(features: Vec<String>, weights: Vec<f64>, intercept: f64) -> Self {
        Self {
            model_version: LINEAR_MODEL_VERSION,
            features,
            weights,
            intercept,
        }
    }

    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        if self.model_version != LINEAR_MODEL_VERSION {
            return Err(ModelLoadError::Invalid(format!(
                "unsupported model_version {} (expected {LINEAR_MODEL_VERSION})",
                self.model_version
            )));
        }
        if self.features.len() != self.weights.len() {
            return Err(ModelLoadError::Invalid(format!(
                "{} features but {} weights",
                self.features.len(),
                self.weights.len()
            )));
        }
        Ok(())
    }

    /// Load a model from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, ModelLoadError> {
        let bytes = std::fs::read(path).map_err(|source| ModelLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_slice(&bytes)?;
        model.validate()?;
        Ok(model)
    }
}

impl Estimator for LinearModel {
    fn predict(&self, data: &Dataset) -> Result<Vec<f64>, EstimatorError> {
        if self.features.len() != self.weights.len() {
            return Err(EstimatorError::ShapeMismatch {
                expected: self.features.len(),
                actual: self.weights.len(),
            });
        }
        let positions = self
            .features
            .iter()
            .map(|name| {
                data.column_index(name)
                    .ok_or_else(|| EstimatorError::MissingFeature(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let x = data.values().select(Axis(1), &positions);
        let weights = Array1::from(self.weights.clone());
        Ok(x.dot(&weights).mapv(|v| v + self.intercept).to_vec())
    }
}
