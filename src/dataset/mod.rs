//! In-memory tabular data and train/test partitioning.

pub mod loader;
pub mod split;

pub use loader::{LoadedTable, load_csv, read_csv};
pub use split::{Split, SplitError, SplitOptions, stratified_split, train_test_split};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Target column {0:?} not found in header")]
    MissingTarget(String),
    #[error("Row {row} has {found} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Table has no data rows")]
    EmptyTable,
    #[error("Non-numeric target {value:?} at row {row}")]
    NonNumericTarget { row: usize, value: String },
}

/// Row-major feature matrix with a shared column schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    /// Build a table, checking every row against the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, DatasetError> {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(DatasetError::RaggedRow {
                row,
                expected: columns.len(),
                found: values.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Build a table with generated column names (`f0`, `f1`, ...).
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DatasetError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let columns = (0..width).map(|idx| format!("f{idx}")).collect();
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of feature columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Copy the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Vec<Vec<f64>> {
        indices
            .iter()
            .filter_map(|&idx| self.rows.get(idx).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_rejected() {
        let err = FeatureTable::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn select_preserves_requested_order() {
        let table =
            FeatureTable::from_rows(vec![vec![0.0], vec![1.0], vec![2.0]]).unwrap();
        assert_eq!(table.columns(), &["f0".to_string()]);
        assert_eq!(table.select(&[2, 0]), vec![vec![2.0], vec![0.0]]);
    }
}
