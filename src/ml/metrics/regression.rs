//! Regression error metrics over aligned `(truth, prediction)` pairs.
//!
//! All functions return `0.0` for empty input; callers reject empty test sets
//! before scoring.

pub fn mean_squared_error(truth: &[f64], predicted: &[f64]) -> f64 {
    mean(truth.iter().zip(predicted).map(|(t, p)| (t - p).powi(2)))
}

pub fn root_mean_squared_error(truth: &[f64], predicted: &[f64]) -> f64 {
    mean_squared_error(truth, predicted).sqrt()
}

pub fn mean_absolute_error(truth: &[f64], predicted: &[f64]) -> f64 {
    mean(truth.iter().zip(predicted).map(|(t, p)| (t - p).abs()))
}

/// Coefficient of determination.
///
/// When `truth` is constant the ratio is undefined; the score is then `1.0`
/// for a perfect prediction and `0.0` otherwise.
pub fn r2_score(truth: &[f64], predicted: &[f64]) -> f64 {
    let n = truth.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    let truth = &truth[..n];
    let mean_truth = truth.iter().sum::<f64>() / n as f64;
    let ss_res: f64 = truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = truth.iter().map(|t| (t - mean_truth).powi(2)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0f64, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
