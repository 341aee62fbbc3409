//! Cross-validation results of a hyperparameter grid search.
//!
//! Results are a column table in the layout of scikit-learn's `cv_results_`:
//! one row per parameter combination, with `rank_test_<metric>` and
//! `mean_test_<metric>` columns. Scores are assumed to be negated losses
//! (e.g. `neg_mean_squared_error`), which is why the best score is reported as
//! `sqrt(-mean)`.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Metric name used when the search was scored with a single scorer.
pub const DEFAULT_METRIC: &str = "score";

#[derive(Debug, Error)]
pub enum CvResultsError {
    #[error("column '{0}' not found in cv results")]
    MissingColumn(String),
    #[error("column '{column}' row {row}: '{value}' is not numeric")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("failed to read cv results {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid cv results json: {0}")]
    InvalidJson(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported cv results file {0} (expected .json or .csv)")]
    UnknownFormat(PathBuf),
}

/// Single cell of a results table.
#[derive(Debug, Clone, PartialEq)]
pub enum CvCell {
    Number(f64),
    Text(String),
    Missing,
}

impl CvCell {
    fn from_json(value: Value) -> Self {
        match value {
            Value::Null => CvCell::Missing,
            Value::Number(number) => number.as_f64().map_or(CvCell::Missing, CvCell::Number),
            Value::String(text) => CvCell::Text(text),
            other => CvCell::Text(other.to_string()),
        }
    }

    fn from_csv(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return CvCell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(number) => CvCell::Number(number),
            Err(_) => CvCell::Text(field.to_string()),
        }
    }

    fn as_text(&self) -> String {
        match self {
            CvCell::Number(number) => number.to_string(),
            CvCell::Text(text) => text.clone(),
            CvCell::Missing => String::new(),
        }
    }
}

/// Column table of cross-validation results.
///
/// Columns keep the order they were added in, which for loaded files is the
/// order of the JSON keys or CSV header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CvResults {
    columns: Vec<(String, Vec<CvCell>)>,
}

impl CvResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append (or replace) a column. All columns must share a row count.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        cells: Vec<CvCell>,
    ) -> Result<Self, CvResultsError> {
        let name = name.into();
        if let Some(expected) = self.columns.first().map(|(_, cells)| cells.len())
            && expected != cells.len()
        {
            return Err(CvResultsError::RaggedColumn {
                column: name,
                expected,
                actual: cells.len(),
            });
        }
        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = cells,
            None => self.columns.push((name, cells)),
        }
        Ok(self)
    }

    /// Convenience wrapper around [`with_column`](Self::with_column) for numeric data.
    pub fn with_numbers(
        self,
        name: impl Into<String>,
        values: &[f64],
    ) -> Result<Self, CvResultsError> {
        self.with_column(name, values.iter().copied().map(CvCell::Number).collect())
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, cells)| cells.len())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[CvCell]> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, cells)| cells.as_slice())
    }

    /// Read a column as numbers; missing cells become NaN.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, CvResultsError> {
        let cells = self
            .column(name)
            .ok_or_else(|| CvResultsError::MissingColumn(name.to_string()))?;
        cells
            .iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                CvCell::Number(number) => Ok(*number),
                CvCell::Missing => Ok(f64::NAN),
                CvCell::Text(text) => Err(CvResultsError::NonNumeric {
                    column: name.to_string(),
                    row,
                    value: text.clone(),
                }),
            })
            .collect()
    }

    /// Parse a JSON object mapping column names to arrays (`cv_results_` dumped as JSON).
    pub fn from_json_str(text: &str) -> Result<Self, CvResultsError> {
        let Value::Object(map) = serde_json::from_str::<Value>(text)? else {
            return Err(CvResultsError::InvalidJson(
                "expected an object of columns".to_string(),
            ));
        };
        let mut results = Self::new();
        for (name, value) in map {
            let Value::Array(items) = value else {
                return Err(CvResultsError::InvalidJson(format!(
                    "column '{name}' is not an array"
                )));
            };
            let cells = items.into_iter().map(CvCell::from_json).collect();
            results = results.with_column(name, cells)?;
        }
        Ok(results)
    }

    /// Parse CSV with a header row (`cv_results_` dumped through a dataframe).
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CvResultsError> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?.clone();
        let mut columns: Vec<Vec<CvCell>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record?;
            for (column, field) in columns.iter_mut().zip(record.iter()) {
                column.push(CvCell::from_csv(field));
            }
        }
        let mut results = Self::new();
        for (name, cells) in headers.iter().zip(columns) {
            results = results.with_column(name, cells)?;
        }
        Ok(results)
    }

    /// Load from a `.json` or `.csv` file, picked by extension.
    pub fn load(path: &Path) -> Result<Self, CvResultsError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let read_error = |source| CvResultsError::Read {
            path: path.to_path_buf(),
            source,
        };
        match extension.as_deref() {
            Some("json") => {
                let text = std::fs::read_to_string(path).map_err(read_error)?;
                Self::from_json_str(&text)
            }
            Some("csv") => Self::from_csv_reader(File::open(path).map_err(read_error)?),
            _ => Err(CvResultsError::UnknownFormat(path.to_path_buf())),
        }
    }
}

/// Anything exposing grid-search cross-validation results.
pub trait GridSearchResult {
    fn cv_results(&self) -> &CvResults;
}

impl GridSearchResult for CvResults {
    fn cv_results(&self) -> &CvResults {
        self
    }
}

/// A top-ranked configuration and its transformed score.
#[derive(Debug, Clone, PartialEq)]
pub struct BestScore {
    /// Row position in the results table.
    pub row: usize,
    /// Text of the row's `params` cell, when the table has one.
    pub params: Option<String>,
    /// `sqrt(-mean_test_score)`; NaN when the mean score is positive.
    pub score: f64,
}

/// `sqrt(-mean_test_score)` for every row ranked first, in row order.
pub fn best_score<G: GridSearchResult + ?Sized>(grid: &G) -> Result<Vec<BestScore>, CvResultsError> {
    best_score_for_metric(grid, DEFAULT_METRIC)
}

/// Like [`best_score`] for multi-metric searches (`rank_test_<metric>`, `mean_test_<metric>`).
pub fn best_score_for_metric<G: GridSearchResult + ?Sized>(
    grid: &G,
    metric: &str,
) -> Result<Vec<BestScore>, CvResultsError> {
    let results = grid.cv_results();
    let ranks = results.numeric_column(&format!("rank_test_{metric}"))?;
    let means = results.numeric_column(&format!("mean_test_{metric}"))?;
    let params = results.column("params");

    let best = ranks
        .iter()
        .zip(&means)
        .enumerate()
        .filter(|(_, (rank, _))| **rank == 1.0)
        .map(|(row, (_, mean))| {
            let score = (-mean).sqrt();
            if score.is_nan() && !mean.is_nan() {
                tracing::warn!(
                    "mean_test_{metric} at row {row} is positive ({mean}); sqrt of its negation is NaN"
                );
            }
            BestScore {
                row,
                params: params.map(|cells| cells[row].as_text()),
                score,
            }
        })
        .collect();
    Ok(best)
}
