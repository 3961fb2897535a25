use crate::ml::estimator::ModelError;

/// Single-node decision tree used as a weak learner.
#[derive(Debug, Clone, PartialEq)]
pub struct Stump {
    /// Feature index used for the split.
    pub feature_index: usize,
    /// Threshold in feature units.
    pub threshold: f64,
    /// Prediction for `feature <= threshold`.
    pub left_value: f64,
    /// Prediction for `feature > threshold` (and for missing values).
    pub right_value: f64,
}

impl Stump {
    /// Predict the stump value for a feature vector.
    pub fn predict(&self, features: &[f64]) -> f64 {
        let value = features.get(self.feature_index).copied().unwrap_or(f64::NAN);
        if value <= self.threshold {
            self.left_value
        } else {
            self.right_value
        }
    }
}

/// Gradient-boosted decision stump model for multi-class classification.
#[derive(Debug, Clone, PartialEq)]
pub struct GbdtStumpModel {
    /// Number of values per feature vector.
    pub feature_len: usize,
    /// Number of classes; class `k` owns column `k` of the raw logits.
    pub n_classes: usize,
    /// Learning rate applied to each stump prediction.
    pub learning_rate: f64,
    /// Initial raw logits before boosting rounds.
    pub init_raw: Vec<f64>,
    /// Shape: `[n_rounds][n_classes]`.
    pub stumps: Vec<Vec<Stump>>,
}

impl GbdtStumpModel {
    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_classes < 2 {
            return Err(ModelError::TooFewClasses(self.n_classes));
        }
        if self.init_raw.len() != self.n_classes {
            return Err(ModelError::FeatureWidth {
                expected: self.n_classes,
                found: self.init_raw.len(),
            });
        }
        if let Some(round) = self.stumps.iter().find(|round| round.len() != self.n_classes) {
            return Err(ModelError::FeatureWidth {
                expected: self.n_classes,
                found: round.len(),
            });
        }
        Ok(())
    }

    /// Predict raw logits for a feature vector.
    pub fn predict_raw(&self, features: &[f64]) -> Vec<f64> {
        let mut raw = self.init_raw.clone();
        for round in &self.stumps {
            for (class_idx, stump) in round.iter().enumerate() {
                raw[class_idx] += self.learning_rate * stump.predict(features);
            }
        }
        raw
    }

    /// Predict class probabilities for a feature vector.
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        softmax(&self.predict_raw(features))
    }
}

/// Gradient-boosted decision stump model for squared-loss regression.
#[derive(Debug, Clone, PartialEq)]
pub struct GbdtRegressionModel {
    pub feature_len: usize,
    pub learning_rate: f64,
    /// Starting prediction (training target mean).
    pub init_value: f64,
    /// One stump per boosting round.
    pub stumps: Vec<Stump>,
}

impl GbdtRegressionModel {
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.stumps.iter().fold(self.init_value, |acc, stump| {
            acc + self.learning_rate * stump.predict(features)
        })
    }
}

/// Compute a numerically-stable softmax for a set of logits.
pub fn softmax(raw: &[f64]) -> Vec<f64> {
    if raw.is_empty() {
        return Vec::new();
    }
    let max = raw
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, |a, b| a.max(b));
    let mut exps = Vec::with_capacity(raw.len());
    let mut sum = 0.0f64;
    for &v in raw {
        let e = (v - max).exp();
        exps.push(e);
        sum += e;
    }
    if sum == 0.0 || !sum.is_finite() {
        return vec![1.0 / raw.len() as f64; raw.len()];
    }
    for v in &mut exps {
        *v /= sum;
    }
    exps
}
