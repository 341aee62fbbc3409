//! Utilities for a tabular prediction workflow: timestamped submission files,
//! best grid-search scores and histogram series.
/// Application directory resolution.
pub mod app_dirs;
/// TOML settings.
pub mod config;
/// Tabular datasets and CSV loading.
pub mod dataset;
/// Tracing subscriber setup.
pub mod logging;
/// Estimators, submissions and grid-search results.
pub mod ml;
/// Histograms.
pub mod stats;

pub use dataset::Dataset;
pub use ml::estimator::{Estimator, EstimatorError};
pub use ml::grid::{BestScore, CvResults, GridSearchResult, best_score};
pub use ml::submission::{SubmissionWriter, write_submission};
pub use stats::histogram::{Bins, HistogramOptions, HistogramSeries, hist};
