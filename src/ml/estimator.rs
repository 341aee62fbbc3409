//! Prediction contract shared by every model that can produce a submission.

use thiserror::Error;

use crate::dataset::Dataset;

/// Errors raised by [`Estimator::predict`].
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// The model has no learned parameters yet.
    #[error("estimator is not fitted")]
    NotFitted,
    /// The dataset lacks a feature the model was trained on.
    #[error("feature '{0}' missing from dataset")]
    MissingFeature(String),
    /// Feature count differs from what the model expects.
    #[error("expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("{0}")]
    Other(String),
}

/// Anything that maps a dataset to one numeric prediction per row, in row order.
pub trait Estimator {
    fn predict(&self, data: &Dataset) -> Result<Vec<f64>, EstimatorError>;
}

impl<F> Estimator for F
where
    F: Fn(&Dataset) -> Result<Vec<f64>, EstimatorError>,
{
    fn predict(&self, data: &Dataset) -> Result<Vec<f64>, EstimatorError> {
        self(data)
    }
}
