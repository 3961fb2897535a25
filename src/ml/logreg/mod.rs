//! Multinomial logistic regression classifier over standardized features.

use crate::ml::estimator::{
    ClassProbabilities, Classifier, ModelError, check_row_width, encode_labels,
};
use crate::ml::gbdt_stump::softmax;

mod train;
pub use train::{TrainOptions, train_logreg};

/// Logistic regression weights plus the standardization fitted on training data.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRegModel {
    pub feature_len: usize,
    pub n_classes: usize,
    /// Row-major `[n_classes][feature_len]`.
    pub weights: Vec<f64>,
    pub bias: Vec<f64>,
    pub feature_mean: Vec<f64>,
    pub feature_std: Vec<f64>,
}

impl LogRegModel {
    /// Validate the model dimensions.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_classes < 2 {
            return Err(ModelError::TooFewClasses(self.n_classes));
        }
        let expected = self.n_classes * self.feature_len;
        if self.weights.len() != expected {
            return Err(ModelError::FeatureWidth {
                expected,
                found: self.weights.len(),
            });
        }
        if self.bias.len() != self.n_classes {
            return Err(ModelError::FeatureWidth {
                expected: self.n_classes,
                found: self.bias.len(),
            });
        }
        if self.feature_mean.len() != self.feature_len || self.feature_std.len() != self.feature_len
        {
            return Err(ModelError::FeatureWidth {
                expected: self.feature_len,
                found: self.feature_mean.len().min(self.feature_std.len()),
            });
        }
        Ok(())
    }

    /// Compute class probabilities for a single feature row.
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let standardized = standardize(features, &self.feature_mean, &self.feature_std);
        softmax(&logits(&self.weights, &self.bias, &standardized, self.n_classes))
    }
}

/// [`Classifier`] backed by a [`LogRegModel`].
#[derive(Debug, Clone)]
pub struct LogRegClassifier<L> {
    options: TrainOptions,
    classes: Vec<L>,
    model: Option<LogRegModel>,
}

impl<L> LogRegClassifier<L> {
    pub fn new(options: TrainOptions) -> Self {
        Self {
            options,
            classes: Vec::new(),
            model: None,
        }
    }
}

impl<L> Default for LogRegClassifier<L> {
    fn default() -> Self {
        Self::new(TrainOptions::default())
    }
}

impl<L: Ord + Clone> Classifier<L> for LogRegClassifier<L> {
    fn fit(&mut self, x: &[Vec<f64>], y: &[L]) -> Result<(), ModelError> {
        let (classes, encoded) = encode_labels(y);
        let model = train_logreg(x, &encoded, classes.len(), &self.options)?;
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
        "logreg"
    }
}

/// Missing values map to the feature mean (zero after standardization).
fn standardize(features: &[f64], mean: &[f64], std: &[f64]) -> Vec<f64> {
    features
        .iter()
        .zip(mean.iter().zip(std))
        .map(|(&v, (&m, &s))| if v.is_finite() { (v - m) / s } else { 0.0 })
        .collect()
}

fn logits(weights: &[f64], bias: &[f64], x: &[f64], n_classes: usize) -> Vec<f64> {
    let dim = x.len();
    (0..n_classes)
        .map(|c| {
            let base = c * dim;
            bias[c]
                + weights[base..base + dim]
                    .iter()
                    .zip(x)
                    .map(|(w, v)| w * v)
                    .sum::<f64>()
        })
        .collect()
}
