//! CSV loader producing a [`FeatureTable`] plus the raw target column.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use tracing::debug;

use super::{DatasetError, FeatureTable};

/// Fully loaded CSV table split into features and target.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    /// Feature columns (every header except the target).
    pub features: FeatureTable,
    /// Name of the target column.
    pub target_name: String,
    /// Raw target cells, trimmed, aligned with the feature rows.
    pub target: Vec<String>,
    /// Ordinal codes for non-numeric columns: code `i` is `categories[column][i]`.
    pub categories: BTreeMap<String, Vec<String>>,
}

impl LoadedTable {
    /// Parse every target cell as a number.
    pub fn numeric_target(&self) -> Result<Vec<f64>, DatasetError> {
        self.target
            .iter()
            .enumerate()
            .map(|(row, value)| {
                value
                    .parse::<f64>()
                    .map_err(|_| DatasetError::NonNumericTarget {
                        row,
                        value: value.clone(),
                    })
            })
            .collect()
    }
}

/// Load a CSV file with a header row.
pub fn load_csv(path: &Path, target_column: &str) -> Result<LoadedTable, DatasetError> {
    let file = std::fs::File::open(path)?;
    let table = read_csv(file, target_column)?;
    debug!(
        path = %path.display(),
        rows = table.features.len(),
        columns = table.features.width(),
        "Loaded CSV table"
    );
    Ok(table)
}

/// Read CSV data with a header row from any reader.
///
/// Columns whose non-empty cells all parse as numbers load as numbers. Other
/// columns are ordinal-encoded over their sorted distinct values. Empty cells
/// load as `NaN`.
pub fn read_csv<R: Read>(reader: R, target_column: &str) -> Result<LoadedTable, DatasetError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let target_idx = headers
        .iter()
        .position(|name| name == target_column)
        .ok_or_else(|| DatasetError::MissingTarget(target_column.to_string()))?;

    let mut cells: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        cells.push(record.iter().map(str::to_string).collect());
    }
    if cells.is_empty() {
        return Err(DatasetError::EmptyTable);
    }

    let feature_idx: Vec<usize> = (0..headers.len()).filter(|&idx| idx != target_idx).collect();
    let mut categories = BTreeMap::new();
    let mut encoders: Vec<Option<Vec<String>>> = Vec::with_capacity(feature_idx.len());
    for &col in &feature_idx {
        let numeric = cells
            .iter()
            .map(|row| row[col].as_str())
            .filter(|cell| !cell.is_empty())
            .all(|cell| cell.parse::<f64>().is_ok());
        if numeric {
            encoders.push(None);
        } else {
            let distinct: Vec<String> = cells
                .iter()
                .map(|row| row[col].clone())
                .filter(|cell| !cell.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            categories.insert(headers[col].clone(), distinct.clone());
            encoders.push(Some(distinct));
        }
    }

    let rows = cells
        .iter()
        .map(|row| {
            feature_idx
                .iter()
                .zip(&encoders)
                .map(|(&col, encoder)| encode_cell(&row[col], encoder.as_deref()))
                .collect()
        })
        .collect();
    let columns = feature_idx.iter().map(|&idx| headers[idx].clone()).collect();
    let target = cells.iter().map(|row| row[target_idx].clone()).collect();

    Ok(LoadedTable {
        features: FeatureTable::new(columns, rows)?,
        target_name: target_column.to_string(),
        target,
        categories,
    })
}

fn encode_cell(cell: &str, categories: Option<&[String]>) -> f64 {
    if cell.is_empty() {
        return f64::NAN;
    }
    match categories {
        Some(categories) => categories
            .binary_search_by(|category| category.as_str().cmp(cell))
            .map(|code| code as f64)
            .unwrap_or(f64::NAN),
        None => cell.parse().unwrap_or(f64::NAN),
    }
}
