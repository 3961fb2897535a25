//! Train/evaluate harness: split, fit, predict, score.
//!
//! Each call owns its split and result. Invalid inputs fail the whole call;
//! there are no partial results.

mod classify;
mod regress;

pub use classify::{ClassificationReport, evaluate_classifier};
pub use regress::{RegressionReport, evaluate_regression};

use thiserror::Error;

use crate::dataset::{DatasetError, SplitError};
use crate::ml::ModelError;
use crate::ml::metrics::RocError;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Feature table has {rows} rows but target has {targets} values")]
    LengthMismatch { rows: usize, targets: usize },
    #[error("Feature table is empty")]
    EmptyDataset,
    #[error("Target needs at least 2 distinct classes, found {0}")]
    TooFewClasses(usize),
    #[error("Positive label {0} is not among the fitted classes")]
    UnknownPositiveLabel(String),
    #[error("Non-finite target value at row {0}")]
    NonFiniteTarget(usize),
    #[error("Estimator returned {found} predictions for {expected} test rows")]
    PredictionCount { expected: usize, found: usize },
    #[error("Probability row {row} has {found} columns, expected {expected}")]
    ProbabilityWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Probability row {row} sums to {sum}, expected 1")]
    ProbabilitySum { row: usize, sum: f64 },
    #[error("Split failed: {0}")]
    Split(#[from] SplitError),
    #[error("Estimator failed: {0}")]
    Model(#[from] ModelError),
    #[error("ROC computation failed: {0}")]
    Roc(#[from] RocError),
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

fn check_aligned(rows: usize, targets: usize) -> Result<(), EvalError> {
    if rows != targets {
        return Err(EvalError::LengthMismatch { rows, targets });
    }
    if rows == 0 {
        return Err(EvalError::EmptyDataset);
    }
    Ok(())
}

/// Largest tolerated distance of a probability row sum from 1.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Every row needs one finite probability per class, summing to 1.
fn check_probability_rows(rows: &[Vec<f64>], n_classes: usize) -> Result<(), EvalError> {
    for (row, values) in rows.iter().enumerate() {
        if values.len() != n_classes {
            return Err(EvalError::ProbabilityWidth {
                row,
                expected: n_classes,
                found: values.len(),
            });
        }
        let sum: f64 = values.iter().sum();
        if !((sum - 1.0).abs() <= PROBABILITY_SUM_TOLERANCE) {
            return Err(EvalError::ProbabilitySum { row, sum });
        }
    }
    Ok(())
}

fn check_prediction_count(expected: usize, found: usize) -> Result<(), EvalError> {
    if expected != found {
        return Err(EvalError::PredictionCount { expected, found });
    }
    Ok(())
}
