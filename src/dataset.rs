//! Tabular datasets keyed by an identifier column.

pub mod loader;

pub use loader::{DatasetLoadError, load_dataset, read_dataset};

use ndarray::{Array2, ArrayView1};

/// In-memory table: one identifier per row plus a dense `f64` feature matrix.
///
/// Identifiers are kept verbatim so they can be written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    index_name: String,
    index: Vec<String>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl Dataset {
    /// Build a dataset from parts.
    ///
    /// Returns `None` if the matrix shape disagrees with the index or column lists.
    pub fn new(
        index_name: impl Into<String>,
        index: Vec<String>,
        columns: Vec<String>,
        values: Array2<f64>,
    ) -> Option<Self> {
        if values.nrows() != index.len() || values.ncols() != columns.len() {
            return None;
        }
        Some(Self {
            index_name: index_name.into(),
            index,
            columns,
            values,
        })
    }

    /// Name of the identifier column.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Row identifiers in row order.
    pub fn index(&self) -> &[String] {
        &self.index
    }

    /// Feature column names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Feature matrix, `n_rows x n_columns`.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Position of a feature column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Borrow a feature column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(name).map(|idx| self.values.column(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn new_rejects_shape_mismatch() {
        let values = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(
            Dataset::new(
                "id",
                vec!["a".into()],
                vec!["x".into(), "y".into()],
                values.clone()
            )
            .is_none()
        );
        assert!(Dataset::new("id", vec!["a".into(), "b".into()], vec!["x".into()], values).is_none());
    }

    #[test]
    fn column_lookup_by_name() {
        let dataset = Dataset::new(
            "id",
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into()],
            array![[1.0, 2.0], [3.0, 4.0]],
        )
        .unwrap();
        assert_eq!(dataset.column_index("y"), Some(1));
        assert_eq!(dataset.column("y").unwrap().to_vec(), vec![2.0, 4.0]);
        assert!(dataset.column("z").is_none());
        assert_eq!(dataset.n_rows(), 2);
    }
}
