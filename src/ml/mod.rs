//! Machine learning building blocks for the evaluators.
//!
//! Estimator contracts, the built-in baseline models, and the metrics used to
//! score them.

pub mod estimator;
pub mod gbdt_stump;
pub mod logreg;
pub mod metrics;

pub use estimator::{ClassProbabilities, Classifier, ModelError, Regressor};
