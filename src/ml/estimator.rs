//! Estimator contracts shared by the evaluators and the built-in models.
//!
//! Any model that can be fitted on a row-major feature matrix and asked for
//! predictions satisfies these traits, so the evaluators never depend on a
//! concrete model type.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

/// Errors raised by estimators while fitting or predicting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Empty training set")]
    EmptyTrainingSet,
    #[error("Mismatched X/Y lengths: {rows} rows, {targets} targets")]
    LengthMismatch { rows: usize, targets: usize },
    #[error("Need at least 2 classes, found {0}")]
    TooFewClasses(usize),
    #[error("Expected {expected} features per row, found {found}")]
    FeatureWidth { expected: usize, found: usize },
    #[error("Model has not been fitted")]
    NotFitted,
    #[error("Non-finite target value at row {0}")]
    NonFiniteTarget(usize),
}

/// Class-probability matrix addressed by class label.
///
/// Each row holds one probability per entry of `classes`, in the same order.
/// Callers look columns up by label rather than by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProbabilities<L> {
    classes: Vec<L>,
    rows: Vec<Vec<f64>>,
}

impl<L> ClassProbabilities<L> {
    pub fn new(classes: Vec<L>, rows: Vec<Vec<f64>>) -> Self {
        Self { classes, rows }
    }

    /// Class labels in column order.
    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    /// Probability rows, one per predicted sample.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<L: PartialEq + Clone> ClassProbabilities<L> {
    /// Column index holding the probability of `label`, if the label is known.
    pub fn column_index(&self, label: &L) -> Option<usize> {
        self.classes.iter().position(|class| class == label)
    }

    /// Probability of `label` for every row, or `None` if the label is
    /// unknown or any row is too short to hold its column.
    pub fn column(&self, label: &L) -> Option<Vec<f64>> {
        let idx = self.column_index(label)?;
        self.rows.iter().map(|row| row.get(idx).copied()).collect()
    }

    /// Most probable label for every row. Ties resolve to the earliest class.
    pub fn argmax_labels(&self) -> Vec<L> {
        self.rows
            .iter()
            .filter_map(|row| self.classes.get(argmax(row)).cloned())
            .collect()
    }
}

/// Fit/predict contract for classifiers over labels of type `L`.
pub trait Classifier<L> {
    /// Fit the model on row-major features and aligned labels.
    fn fit(&mut self, x: &[Vec<f64>], y: &[L]) -> Result<(), ModelError>;

    /// Classes seen during fitting, in probability column order.
    fn classes(&self) -> &[L];

    /// Class-probability estimates, one row per input row.
    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<ClassProbabilities<L>, ModelError>;

    /// Hard label predictions. Defaults to the argmax of `predict_proba`.
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<L>, ModelError>
    where
        L: PartialEq + Clone,
    {
        Ok(self.predict_proba(x)?.argmax_labels())
    }

    fn name(&self) -> &str {
        "classifier"
    }
}

/// Fit/predict contract for regressors over continuous targets.
pub trait Regressor {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError>;

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError>;

    fn name(&self) -> &str {
        "regressor"
    }
}

/// Map labels to dense class indices over their sorted distinct values.
pub fn encode_labels<L: Ord + Clone>(y: &[L]) -> (Vec<L>, Vec<usize>) {
    let classes: Vec<L> = y.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
    let encoded = y
        .iter()
        .map(|label| classes.binary_search(label).unwrap_or(0))
        .collect();
    (classes, encoded)
}

/// Validate training inputs and return the shared feature width.
pub(crate) fn check_training_rows(x: &[Vec<f64>], targets: usize) -> Result<usize, ModelError> {
    if x.len() != targets {
        return Err(ModelError::LengthMismatch {
            rows: x.len(),
            targets,
        });
    }
    let first = x.first().ok_or(ModelError::EmptyTrainingSet)?;
    check_row_width(x, first.len())?;
    Ok(first.len())
}

/// Ensure every row has exactly `expected` features.
pub(crate) fn check_row_width(x: &[Vec<f64>], expected: usize) -> Result<(), ModelError> {
    match x.iter().find(|row| row.len() != expected) {
        Some(row) => Err(ModelError::FeatureWidth {
            expected,
            found: row.len(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = f64::NEG_INFINITY;
    for (idx, &v) in values.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = idx;
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_labels_sorts_distinct_values() {
        let (classes, encoded) = encode_labels(&["b", "a", "c", "a"]);
        assert_eq!(classes, vec!["a", "b", "c"]);
        assert_eq!(encoded, vec![1, 0, 2, 0]);
    }

    #[test]
    fn column_lookup_is_by_label() {
        let proba = ClassProbabilities::new(
            vec![7, 3],
            vec![vec![0.25, 0.75], vec![0.9, 0.1]],
        );
        assert_eq!(proba.column(&3), Some(vec![0.75, 0.1]));
        assert_eq!(proba.column(&7), Some(vec![0.25, 0.9]));
        assert_eq!(proba.column(&1), None);
        assert_eq!(proba.argmax_labels(), vec![3, 7]);
    }

    #[test]
    fn short_rows_have_no_column() {
        let proba = ClassProbabilities::new(vec![0, 1], vec![vec![0.4, 0.6], vec![0.3]]);
        assert_eq!(proba.column(&0), Some(vec![0.4, 0.3]));
        assert_eq!(proba.column(&1), None);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let x = vec![vec![0.0, 1.0], vec![2.0]];
        assert_eq!(
            check_training_rows(&x, 2),
            Err(ModelError::FeatureWidth {
                expected: 2,
                found: 1
            })
        );
    }
}
