//! Deterministic gradient-boosted decision stumps.
//!
//! This is a lightweight baseline that avoids external ML dependencies while still supporting:
//! - Multi-class classification via softmax boosting.
//! - Regression via squared-loss boosting.
//! - Reproducible results: training has no random component.

mod model;
mod train;

pub use model::{GbdtRegressionModel, GbdtStumpModel, Stump, softmax};
pub use train::{TrainOptions, train_gbdt_regressor, train_gbdt_stump};

use crate::ml::estimator::{
    ClassProbabilities, Classifier, ModelError, Regressor, check_row_width, encode_labels,
};

/// [`Classifier`] backed by a [`GbdtStumpModel`].
#[derive(Debug, Clone)]
pub struct GbdtStumpClassifier<L> {
    options: TrainOptions,
    classes: Vec<L>,
    model: Option<GbdtStumpModel>,
}

impl<L> GbdtStumpClassifier<L> {
    pub fn new(options: TrainOptions) -> Self {
        Self {
            options,
            classes: Vec::new(),
            model: None,
        }
    }
}

impl<L> Default for GbdtStumpClassifier<L> {
    fn default() -> Self {
        Self::new(TrainOptions::default())
    }
}

impl<L: Ord + Clone> Classifier<L> for GbdtStumpClassifier<L> {
    fn fit(&mut self, x: &[Vec<f64>], y: &[L]) -> Result<(), ModelError> {
        let (classes, encoded) = encode_labels(y);
        let model = train_gbdt_stump(x, &encoded, classes.len(), &self.options)?;
        self.classes = classes;
        self.model = Some(model);
        Ok(())
    }

    fn classes(&self) -> &[L] {
        &self.classes
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<ClassProbabilities<L>, ModelError> {
        let model = self.model.as_ref().ok_or(ModelError::NotFitted)?;
        check_row_width(x, model.feature_len)?;
        let rows = x.iter().map(|row| model.predict_proba(row)).collect();
        Ok(ClassProbabilities::new(self.classes.clone(), rows))
    }

    fn name(&self) -> &str {
        "gbdt_stump"
    }
}

/// [`Regressor`] backed by a [`GbdtRegressionModel`].
#[derive(Debug, Clone, Default)]
pub struct GbdtStumpRegressor {
    options: TrainOptions,
    model: Option<GbdtRegressionModel>,
}

impl GbdtStumpRegressor {
    pub fn new(options: TrainOptions) -> Self {
        Self {
            options,
            model: None,
        }
    }
}

impl Regressor for GbdtStumpRegressor {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError> {
        self.model = Some(train_gbdt_regressor(x, y, &self.options)?);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        let model = self.model.as_ref().ok_or(ModelError::NotFitted)?;
        check_row_width(x, model.feature_len)?;
        Ok(x.iter().map(|row| model.predict(row)).collect())
    }

    fn name(&self) -> &str {
        "gbdt_stump"
    }
}
