use tracing::debug;

use super::model::{GbdtRegressionModel, GbdtStumpModel, Stump, softmax};
use crate::ml::estimator::{ModelError, check_training_rows};

/// Training hyperparameters for stump boosting.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    /// Number of boosting rounds.
    pub rounds: usize,
    /// Learning rate applied per round.
    pub learning_rate: f64,
    /// Number of bins used for split search.
    pub bins: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            rounds: 100,
            learning_rate: 0.1,
            bins: 32,
        }
    }
}

/// Train a multi-class stump-GBDT model using softmax gradient boosting.
///
/// `y` holds dense class indices in `0..n_classes`.
pub fn train_gbdt_stump(
    x: &[Vec<f64>],
    y: &[usize],
    n_classes: usize,
    options: &TrainOptions,
) -> Result<GbdtStumpModel, ModelError> {
    let d = check_training_rows(x, y.len())?;
    if n_classes < 2 {
        return Err(ModelError::TooFewClasses(n_classes));
    }

    let n = x.len();
    let bins = FeatureBins::new(x, d, options.bins);
    let priors = class_priors(y, n_classes);
    let init_raw: Vec<f64> = priors.iter().map(|&p| p.max(1e-6).ln()).collect();
    let mut raw = vec![init_raw.clone(); n];

    let mut rounds_out: Vec<Vec<Stump>> = Vec::with_capacity(options.rounds);
    for _round in 0..options.rounds {
        let probs: Vec<Vec<f64>> = raw.iter().map(|r| softmax(r)).collect();
        let residuals = compute_residuals(y, &probs, n_classes);

        let mut stumps_for_round = Vec::with_capacity(n_classes);
        for (class_idx, class_residuals) in residuals.iter().enumerate() {
            let stump = bins.fit_stump(x, class_residuals);
            for (row_raw, row) in raw.iter_mut().zip(x) {
                row_raw[class_idx] += options.learning_rate * stump.predict(row);
            }
            stumps_for_round.push(stump);
        }
        rounds_out.push(stumps_for_round);
    }
    debug!(
        rows = n,
        features = d,
        classes = n_classes,
        rounds = options.rounds,
        "Trained stump classifier"
    );

    let model = GbdtStumpModel {
        feature_len: d,
        n_classes,
        learning_rate: options.learning_rate,
        init_raw,
        stumps: rounds_out,
    };
    model.validate()?;
    Ok(model)
}

/// Train a stump-GBDT regressor by boosting on squared-loss residuals.
pub fn train_gbdt_regressor(
    x: &[Vec<f64>],
    y: &[f64],
    options: &TrainOptions,
) -> Result<GbdtRegressionModel, ModelError> {
    let d = check_training_rows(x, y.len())?;
    if let Some(row) = y.iter().position(|v| !v.is_finite()) {
        return Err(ModelError::NonFiniteTarget(row));
    }

    let bins = FeatureBins::new(x, d, options.bins);
    let init_value = y.iter().sum::<f64>() / y.len() as f64;
    let mut predictions = vec![init_value; x.len()];
    let mut stumps = Vec::with_capacity(options.rounds);
    for _round in 0..options.rounds {
        let residuals: Vec<f64> = y
            .iter()
            .zip(&predictions)
            .map(|(target, pred)| target - pred)
            .collect();
        let stump = bins.fit_stump(x, &residuals);
        for (pred, row) in predictions.iter_mut().zip(x) {
            *pred += options.learning_rate * stump.predict(row);
        }
        stumps.push(stump);
    }
    debug!(
        rows = x.len(),
        features = d,
        rounds = options.rounds,
        "Trained stump regressor"
    );

    Ok(GbdtRegressionModel {
        feature_len: d,
        learning_rate: options.learning_rate,
        init_value,
        stumps,
    })
}

fn class_priors(y: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes];
    for &label in y {
        if label < n_classes {
            counts[label] += 1;
        }
    }
    let total = y.len().max(1) as f64;
    counts.into_iter().map(|c| c as f64 / total).collect()
}

fn compute_residuals(y: &[usize], probs: &[Vec<f64>], n_classes: usize) -> Vec<Vec<f64>> {
    let n = y.len();
    let mut residuals = vec![vec![0.0f64; n]; n_classes];
    for (i, (&yi, row_probs)) in y.iter().zip(probs).enumerate() {
        for (k, class_residuals) in residuals.iter_mut().enumerate() {
            let target = if yi == k { 1.0 } else { 0.0 };
            class_residuals[i] = target - row_probs[k];
        }
    }
    residuals
}

/// Per-feature quantization computed once and reused for every stump fit.
struct FeatureBins {
    mins: Vec<f64>,
    maxs: Vec<f64>,
    bins: usize,
    binned: Vec<Vec<u8>>,
}

impl FeatureBins {
    fn new(x: &[Vec<f64>], feature_len: usize, bins: usize) -> Self {
        let bins = bins.clamp(2, 256);
        let (mins, maxs) = compute_feature_min_max(x, feature_len);
        let binned = bin_features(x, &mins, &maxs, bins);
        Self {
            mins,
            maxs,
            bins,
            binned,
        }
    }

    fn fit_stump(&self, x: &[Vec<f64>], residuals: &[f64]) -> Stump {
        let mut best = BestSplit::default();
        for feature_idx in 0..self.mins.len() {
            let split = best_split_for_feature(&self.binned, residuals, feature_idx, self.bins);
            if split.score < best.score {
                best = split;
            }
        }

        let feature_idx = best.feature_index;
        let threshold = threshold_for_bin(
            self.mins.get(feature_idx).copied().unwrap_or(0.0),
            self.maxs.get(feature_idx).copied().unwrap_or(1.0),
            best.split_bin,
            self.bins,
        );
        let (left_value, right_value) =
            leaf_means_for_threshold(x, residuals, feature_idx, threshold);
        Stump {
            feature_index: feature_idx,
            threshold,
            left_value,
            right_value,
        }
    }
}

fn compute_feature_min_max(x: &[Vec<f64>], feature_len: usize) -> (Vec<f64>, Vec<f64>) {
    let mut mins = vec![f64::INFINITY; feature_len];
    let mut maxs = vec![f64::NEG_INFINITY; feature_len];
    for row in x {
        for (j, &v) in row.iter().take(feature_len).enumerate() {
            if v.is_finite() {
                mins[j] = mins[j].min(v);
                maxs[j] = maxs[j].max(v);
            }
        }
    }
    for j in 0..feature_len {
        if !mins[j].is_finite() || !maxs[j].is_finite() {
            mins[j] = 0.0;
            maxs[j] = 0.0;
        }
        if mins[j] == maxs[j] {
            maxs[j] = mins[j] + 1.0;
        }
    }
    (mins, maxs)
}

fn bin_features(x: &[Vec<f64>], mins: &[f64], maxs: &[f64], bins: usize) -> Vec<Vec<u8>> {
    let top = (bins - 1) as f64;
    let mut out: Vec<Vec<u8>> = Vec::with_capacity(x.len());
    for row in x {
        let mut binned = Vec::with_capacity(mins.len());
        for (j, &min) in mins.iter().enumerate() {
            let max = maxs[j];
            let v = row.get(j).copied().unwrap_or(f64::NAN);
            // Missing values land in the top bin, matching the stump's right branch.
            let t = if !v.is_finite() {
                1.0
            } else if max > min {
                ((v - min) / (max - min)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            binned.push((t * top).round() as u8);
        }
        out.push(binned);
    }
    out
}

#[derive(Debug, Clone)]
struct BestSplit {
    score: f64,
    feature_index: usize,
    split_bin: usize,
}

impl Default for BestSplit {
    fn default() -> Self {
        Self {
            score: f64::INFINITY,
            feature_index: 0,
            split_bin: 0,
        }
    }
}

fn best_split_for_feature(
    binned: &[Vec<u8>],
    residuals: &[f64],
    feature_idx: usize,
    bins: usize,
) -> BestSplit {
    let mut counts = vec![0u32; bins];
    let mut sums = vec![0f64; bins];
    let mut sums_sq = vec![0f64; bins];
    for (row, &r) in binned.iter().zip(residuals) {
        let b = row.get(feature_idx).copied().unwrap_or(0) as usize;
        counts[b] += 1;
        sums[b] += r;
        sums_sq[b] += r * r;
    }
    let total_count: u32 = counts.iter().sum();
    if total_count == 0 {
        return BestSplit::default();
    }
    let total_sum: f64 = sums.iter().sum();
    let total_sum_sq: f64 = sums_sq.iter().sum();

    let mut best_score = f64::INFINITY;
    let mut best_bin = 0usize;

    let mut left_count = 0u32;
    let mut left_sum = 0f64;
    let mut left_sum_sq = 0f64;

    for split_bin in 0..(bins - 1) {
        left_count += counts[split_bin];
        left_sum += sums[split_bin];
        left_sum_sq += sums_sq[split_bin];
        let right_count = total_count - left_count;
        if left_count == 0 || right_count == 0 {
            continue;
        }
        let right_sum = total_sum - left_sum;
        let right_sum_sq = total_sum_sq - left_sum_sq;
        let left_sse = left_sum_sq - (left_sum * left_sum) / left_count as f64;
        let right_sse = right_sum_sq - (right_sum * right_sum) / right_count as f64;
        let score = left_sse + right_sse;
        if score < best_score {
            best_score = score;
            best_bin = split_bin;
        }
    }

    BestSplit {
        score: best_score,
        feature_index: feature_idx,
        split_bin: best_bin,
    }
}

fn threshold_for_bin(min: f64, max: f64, split_bin: usize, bins: usize) -> f64 {
    // Bin `b` covers values rounding to `b / (bins - 1)`; cut halfway to the next bin.
    let t = (split_bin as f64 + 0.5) / (bins - 1) as f64;
    min + t * (max - min)
}

fn leaf_means_for_threshold(
    x: &[Vec<f64>],
    residuals: &[f64],
    feature_idx: usize,
    threshold: f64,
) -> (f64, f64) {
    let mut left_sum = 0.0f64;
    let mut left_count = 0u32;
    let mut right_sum = 0.0f64;
    let mut right_count = 0u32;
    for (row, &r) in x.iter().zip(residuals) {
        let v = row.get(feature_idx).copied().unwrap_or(f64::NAN);
        if v <= threshold {
            left_sum += r;
            left_count += 1;
        } else {
            right_sum += r;
            right_count += 1;
        }
    }
    let left_mean = if left_count == 0 {
        0.0
    } else {
        left_sum / left_count as f64
    };
    let right_mean = if right_count == 0 {
        0.0
    } else {
        right_sum / right_count as f64
    };
    (left_mean, right_mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::estimator::argmax;

    fn separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let v = i as f64 / 40.0;
            x.push(vec![v, 0.5]);
            y.push(if v < 0.5 { 0 } else { 1 });
        }
        (x, y)
    }

    #[test]
    fn classifier_learns_threshold_feature() {
        let (x, y) = separable();
        let model = train_gbdt_stump(&x, &y, 2, &TrainOptions::default()).unwrap();
        let correct = x
            .iter()
            .zip(&y)
            .filter(|(row, label)| argmax(&model.predict_proba(row)) == **label)
            .count();
        assert_eq!(correct, x.len());
        assert!(model.stumps.iter().all(|round| round[0].feature_index == 0));
    }

    #[test]
    fn classifier_rejects_single_class() {
        let x = vec![vec![0.0], vec![1.0]];
        let err = train_gbdt_stump(&x, &[0, 0], 1, &TrainOptions::default()).unwrap_err();
        assert_eq!(err, ModelError::TooFewClasses(1));
    }

    #[test]
    fn classifier_rejects_length_mismatch() {
        let x = vec![vec![0.0], vec![1.0]];
        let err = train_gbdt_stump(&x, &[0], 2, &TrainOptions::default()).unwrap_err();
        assert_eq!(err, ModelError::LengthMismatch { rows: 2, targets: 1 });
    }

    #[test]
    fn regressor_fits_step_function() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..20).map(|i| if i < 10 { 1.0 } else { 5.0 }).collect();
        let model = train_gbdt_regressor(&x, &y, &TrainOptions::default()).unwrap();
        assert!((model.predict(&[2.0]) - 1.0).abs() < 0.01);
        assert!((model.predict(&[17.0]) - 5.0).abs() < 0.01);
    }

    #[test]
    fn regressor_on_constant_target_predicts_constant() {
        let x: Vec<Vec<f64>> = (0..9).map(|i| vec![i as f64]).collect();
        let y = vec![4.0; 9];
        let model = train_gbdt_regressor(&x, &y, &TrainOptions::default()).unwrap();
        assert_eq!(model.init_value, 4.0);
        assert_eq!(model.predict(&[3.0]), 4.0);
    }

    #[test]
    fn regressor_rejects_non_finite_target() {
        let x = vec![vec![0.0], vec![1.0]];
        let err = train_gbdt_regressor(&x, &[1.0, f64::NAN], &TrainOptions::default())
            .unwrap_err();
        assert_eq!(err, ModelError::NonFiniteTarget(1));
    }
}
