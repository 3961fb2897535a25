//! Train/evaluate harness for tabular classifiers and regressors.
//!
//! The evaluators split a dataset with a seeded partition, fit an estimator on
//! the train subset and score it on the test subset.

/// Application directory resolution.
pub mod app_dirs;
/// Evaluation settings.
pub mod config;
/// Feature tables, CSV loading and train/test splitting.
pub mod dataset;
/// Classifier and regressor evaluators.
pub mod eval;
/// Tracing subscriber setup for binaries.
pub mod logging;
/// Estimators and metrics.
pub mod ml;

pub use dataset::{FeatureTable, Split, SplitOptions};
pub use eval::{
    ClassificationReport, EvalError, RegressionReport, evaluate_classifier, evaluate_regression,
};
