//! Submission files: one prediction per dataset row, keyed by the row identifier.
//!
//! Without an explicit output path the file name embeds the wall-clock time at
//! second granularity (`submission_05_03_2024__14_22_31.csv`), so two writes in
//! the same second land on the same file and the later one wins.

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use super::estimator::{Estimator, EstimatorError};
use crate::dataset::{Dataset, DatasetLoadError, load_dataset};
use crate::logging::now_local_or_utc;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("failed to load default dataset: {0}")]
    Dataset(#[from] DatasetLoadError),
    #[error("prediction failed: {0}")]
    Predict(#[from] EstimatorError),
    #[error("estimator returned {actual} predictions for {expected} rows")]
    PredictionCount { expected: usize, actual: usize },
    #[error("failed to format submission timestamp: {0}")]
    FormatTime(#[from] time::error::Format),
    #[error("failed to create submission file {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write submission: {0}")]
    Write(#[from] csv::Error),
    #[error("failed to flush submission file {path}: {source}")]
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Locations and column names used when the caller omits them.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionDefaults {
    /// Directory holding the default dataset and generated submissions.
    pub data_dir: PathBuf,
    /// Default dataset file name inside `data_dir`.
    pub test_file: String,
    /// Identifier column of the default dataset.
    pub id_column: String,
    /// Name of the prediction column.
    pub target_column: String,
    /// Prefix of generated submission file names.
    pub file_prefix: String,
}

impl Default for SubmissionDefaults {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            test_file: "test.csv".to_string(),
            id_column: "id".to_string(),
            target_column: "target".to_string(),
            file_prefix: "submission".to_string(),
        }
    }
}

/// Writes estimator predictions as a two-column CSV.
#[derive(Debug, Clone, Default)]
pub struct SubmissionWriter {
    defaults: SubmissionDefaults,
}

impl SubmissionWriter {
    pub fn new(defaults: SubmissionDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &SubmissionDefaults {
        &self.defaults
    }

    /// Path of the default dataset.
    pub fn default_dataset_path(&self) -> PathBuf {
        self.defaults.data_dir.join(&self.defaults.test_file)
    }

    /// Timestamped submission path for `now` inside the default directory.
    pub fn default_outfile(&self, now: OffsetDateTime) -> Result<PathBuf, SubmissionError> {
        let name = format_submission_file_name(&self.defaults.file_prefix, now)?;
        Ok(self.defaults.data_dir.join(name))
    }

    /// Predict on `data` (or the default dataset) and write the submission.
    ///
    /// Returns the path that was written.
    pub fn write<E: Estimator + ?Sized>(
        &self,
        estimator: &E,
        data: Option<&Dataset>,
        outfile: Option<&Path>,
    ) -> Result<PathBuf, SubmissionError> {
        self.write_at(estimator, data, outfile, now_local_or_utc())
    }

    /// Same as [`write`](Self::write), with `now` used for the default file name.
    pub fn write_at<E: Estimator + ?Sized>(
        &self,
        estimator: &E,
        data: Option<&Dataset>,
        outfile: Option<&Path>,
        now: OffsetDateTime,
    ) -> Result<PathBuf, SubmissionError> {
        let loaded;
        let data = match data {
            Some(data) => data,
            None => {
                loaded = load_dataset(&self.default_dataset_path(), &self.defaults.id_column)?;
                &loaded
            }
        };
        let outfile = match outfile {
            Some(path) => path.to_path_buf(),
            None => self.default_outfile(now)?,
        };

        let predictions = estimator.predict(data)?;
        if predictions.len() != data.n_rows() {
            return Err(SubmissionError::PredictionCount {
                expected: data.n_rows(),
                actual: predictions.len(),
            });
        }

        write_csv(&outfile, data, &self.defaults.target_column, &predictions)?;
        tracing::info!(
            "Wrote submission with {} rows to {}",
            predictions.len(),
            outfile.display()
        );
        Ok(outfile)
    }
}

/// Write a submission using the built-in defaults (`data/test.csv`, `data/`).
pub fn write_submission<E: Estimator + ?Sized>(
    estimator: &E,
    data: Option<&Dataset>,
    outfile: Option<&Path>,
) -> Result<PathBuf, SubmissionError> {
    SubmissionWriter::default().write(estimator, data, outfile)
}

/// `<prefix>_<DD>_<MM>_<YYYY>__<HH>_<MM>_<SS>.csv`
pub fn format_submission_file_name(
    prefix: &str,
    now: OffsetDateTime,
) -> Result<String, SubmissionError> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[day]_[month]_[year]__[hour]_[minute]_[second]");
    let stamp = now.format(NAME_FORMAT)?;
    Ok(format!("{prefix}_{stamp}.csv"))
}

fn write_csv(
    path: &Path,
    data: &Dataset,
    target_column: &str,
    predictions: &[f64],
) -> Result<(), SubmissionError> {
    let file = File::create(path).map_err(|source| SubmissionError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record([data.index_name(), target_column])?;
    for (id, value) in data.index().iter().zip(predictions) {
        writer.write_record([id.as_str(), format_float(*value).as_str()])?;
    }
    writer.flush().map_err(|source| SubmissionError::Flush {
        path: path.to_path_buf(),
        source,
    })
}

/// Dataframe-style float text: `2.0` for integral values, empty for NaN.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if value.is_infinite() {
        if value > 0.0 { "inf".into() } else { "-inf".into() }
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
