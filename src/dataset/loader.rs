//! CSV loader for datasets with a named identifier column.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use thiserror::Error;

use super::Dataset;

#[derive(Debug, Error)]
pub enum DatasetLoadError {
    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("index column '{0}' not found")]
    MissingIndexColumn(String),
    #[error("row {row}, column '{column}': '{value}' is not a number")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },
    #[error("feature matrix shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Load a CSV file, using `index_column` as the row identifier.
pub fn load_dataset(path: &Path, index_column: &str) -> Result<Dataset, DatasetLoadError> {
    let file = File::open(path).map_err(|source| DatasetLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = read_dataset(file, index_column)?;
    tracing::debug!(
        "Loaded {} rows x {} features from {}",
        dataset.n_rows(),
        dataset.columns().len(),
        path.display()
    );
    Ok(dataset)
}

/// Parse CSV with a header row from any reader.
///
/// Every column other than the index must be numeric; empty cells load as NaN.
pub fn read_dataset<R: Read>(reader: R, index_column: &str) -> Result<Dataset, DatasetLoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let index_pos = headers
        .iter()
        .position(|name| name == index_column)
        .ok_or_else(|| DatasetLoadError::MissingIndexColumn(index_column.to_string()))?;
    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(pos, _)| *pos != index_pos)
        .map(|(_, name)| name.to_string())
        .collect();

    let mut index = Vec::new();
    let mut flat = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let mut feature = 0usize;
        for (pos, cell) in record.iter().enumerate() {
            if pos == index_pos {
                index.push(cell.to_string());
                continue;
            }
            let value = parse_cell(cell).ok_or_else(|| DatasetLoadError::InvalidCell {
                row,
                column: columns[feature].clone(),
                value: cell.to_string(),
            })?;
            flat.push(value);
            feature += 1;
        }
    }

    let values = Array2::from_shape_vec((index.len(), columns.len()), flat)?;
    Ok(Dataset {
        index_name: index_column.to_string(),
        index,
        columns,
        values,
    })
}

fn parse_cell(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Some(f64::NAN);
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_column_is_split_from_features() {
        let csv = "f1,id,f2\n0.5,7,1\n1.5,3,-2\n";
        let dataset = read_dataset(csv.as_bytes(), "id").unwrap();
        assert_eq!(dataset.index_name(), "id");
        assert_eq!(dataset.index(), ["7", "3"]);
        assert_eq!(dataset.columns(), ["f1", "f2"]);
        assert_eq!(dataset.values()[[1, 0]], 1.5);
        assert_eq!(dataset.values()[[1, 1]], -2.0);
    }

    #[test]
    fn empty_cells_load_as_nan() {
        let dataset = read_dataset("id,x\na,\n".as_bytes(), "id").unwrap();
        assert!(dataset.values()[[0, 0]].is_nan());
    }

    #[test]
    fn identifiers_are_kept_verbatim() {
        let dataset = read_dataset("id,x\n007,1\n".as_bytes(), "id").unwrap();
        assert_eq!(dataset.index(), ["007"]);
    }

    #[test]
    fn missing_index_column_is_reported() {
        let err = read_dataset("row,x\n1,2\n".as_bytes(), "id").unwrap_err();
        assert!(matches!(err, DatasetLoadError::MissingIndexColumn(name) if name == "id"));
    }

    #[test]
    fn non_numeric_feature_is_reported() {
        let err = read_dataset("id,x\n1,abc\n".as_bytes(), "id").unwrap_err();
        match err {
            DatasetLoadError::InvalidCell { row, column, value } => {
                assert_eq!(row, 0);
                assert_eq!(column, "x");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ragged_rows_surface_csv_error() {
        let err = read_dataset("id,x\n1,2,3\n".as_bytes(), "id").unwrap_err();
        assert!(matches!(err, DatasetLoadError::Csv(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_dataset(Path::new("does/not/exist.csv"), "id").unwrap_err();
        assert!(err.to_string().contains("exist.csv"));
    }
}
