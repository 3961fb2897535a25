use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};
use tracing::debug;

use super::{LogRegModel, logits, standardize};
use crate::ml::estimator::{ModelError, check_training_rows};
use crate::ml::gbdt_stump::softmax;

/// Training options for the logistic regression classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
    pub batch_size: usize,
    pub seed: u64,
    pub balance_classes: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 50,
            learning_rate: 0.1,
            l2: 1e-4,
            batch_size: 32,
            seed: 42,
            balance_classes: false,
        }
    }
}

/// Train a softmax regression head with mini-batch gradient descent.
///
/// `y` holds dense class indices in `0..n_classes`.
pub fn train_logreg(
    x: &[Vec<f64>],
    y: &[usize],
    n_classes: usize,
    options: &TrainOptions,
) -> Result<LogRegModel, ModelError> {
    let dim = check_training_rows(x, y.len())?;
    if n_classes < 2 {
        return Err(ModelError::TooFewClasses(n_classes));
    }

    let (feature_mean, feature_std) = feature_mean_std(x, dim);
    let standardized: Vec<Vec<f64>> = x
        .iter()
        .map(|row| standardize(row, &feature_mean, &feature_std))
        .collect();

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut weights = vec![0.0f64; n_classes * dim];
    let mut bias = vec![0.0f64; n_classes];
    for w in &mut weights {
        *w = (rng.random::<f64>() - 0.5) * 0.01;
    }

    let mut indices: Vec<usize> = (0..x.len()).collect();
    let batch_size = options.batch_size.max(1);
    let lr = options.learning_rate;
    let l2 = options.l2.max(0.0);
    let class_weights = class_weights(y, n_classes, options.balance_classes);

    for _epoch in 0..options.epochs {
        indices.shuffle(&mut rng);
        for chunk in indices.chunks(batch_size) {
            let mut grad_w = vec![0.0f64; weights.len()];
            let mut grad_b = vec![0.0f64; bias.len()];
            let mut batch_weight = 0.0f64;
            for &idx in chunk {
                let row = &standardized[idx];
                let label = y[idx];
                if label >= n_classes {
                    continue;
                }
                let weight = class_weights[label];
                if weight == 0.0 {
                    continue;
                }
                let probs = softmax(&logits(&weights, &bias, row, n_classes));
                for (c, &p) in probs.iter().enumerate() {
                    let diff = p - if c == label { 1.0 } else { 0.0 };
                    let base = c * dim;
                    for (i, &v) in row.iter().enumerate() {
                        grad_w[base + i] += diff * v * weight;
                    }
                    grad_b[c] += diff * weight;
                }
                batch_weight += weight;
            }
            if batch_weight == 0.0 {
                continue;
            }
            let inv = 1.0 / batch_weight;
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= lr * (g * inv + l2 * *w);
            }
            for (b, g) in bias.iter_mut().zip(&grad_b) {
                *b -= lr * g * inv;
            }
        }
    }
    debug!(
        rows = x.len(),
        features = dim,
        classes = n_classes,
        epochs = options.epochs,
        "Trained logistic regression"
    );

    let model = LogRegModel {
        feature_len: dim,
        n_classes,
        weights,
        bias,
        feature_mean,
        feature_std,
    };
    model.validate()?;
    Ok(model)
}

fn class_weights(y: &[usize], n_classes: usize, balance: bool) -> Vec<f64> {
    if !balance {
        return vec![1.0; n_classes];
    }
    let mut counts = vec![0f64; n_classes];
    for &label in y {
        if label < n_classes {
            counts[label] += 1.0;
        }
    }
    let total: f64 = counts.iter().sum();
    counts
        .into_iter()
        .map(|count| {
            if count == 0.0 {
                0.0
            } else {
                total / (n_classes as f64 * count)
            }
        })
        .collect()
}

/// Per-feature mean and standard deviation over finite values.
///
/// Constant or missing columns get a unit deviation so they standardize to zero.
fn feature_mean_std(x: &[Vec<f64>], dim: usize) -> (Vec<f64>, Vec<f64>) {
    let mut sums = vec![0f64; dim];
    let mut counts = vec![0usize; dim];
    for row in x {
        for (j, &v) in row.iter().enumerate().take(dim) {
            if v.is_finite() {
                sums[j] += v;
                counts[j] += 1;
            }
        }
    }
    let mean: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| if c == 0 { 0.0 } else { s / c as f64 })
        .collect();
    let mut sq = vec![0f64; dim];
    for row in x {
        for (j, &v) in row.iter().enumerate().take(dim) {
            if v.is_finite() {
                sq[j] += (v - mean[j]).powi(2);
            }
        }
    }
    let std = sq
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| {
            let std = if c == 0 { 0.0 } else { (s / c as f64).sqrt() };
            if std > 1e-12 { std } else { 1.0 }
        })
        .collect();
    (mean, std)
}
