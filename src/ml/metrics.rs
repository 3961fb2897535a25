//! Evaluation metrics for classification and regression models.

mod regression;
mod roc;

pub use regression::{mean_absolute_error, mean_squared_error, r2_score, root_mean_squared_error};
pub use roc::{RocCurve, RocError, RocPoint, roc_auc, roc_curve};

#[derive(Debug, Clone)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    /// Build a matrix from aligned labels, indexing classes by their position in `classes`.
    ///
    /// Labels missing from `classes` are skipped.
    pub fn from_labels<L: PartialEq>(classes: &[L], truth: &[L], predicted: &[L]) -> Self {
        let mut cm = Self::new(classes.len());
        for (t, p) in truth.iter().zip(predicted) {
            let t_idx = classes.iter().position(|c| c == t);
            let p_idx = classes.iter().position(|c| c == p);
            if let (Some(t_idx), Some(p_idx)) = (t_idx, p_idx) {
                cm.add(t_idx, p_idx);
            }
        }
        cm
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f64,
    /// `TP / (TP + FN)`.
    pub recall: f64,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Compute per-class precision and recall from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx) as f64;
        let mut fp = 0f64;
        let mut fn_ = 0f64;
        let mut support = 0u32;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += v as f64;
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += cm.get(i, class_idx) as f64;
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        stats.push(PerClassStats {
            precision,
            recall,
            support,
        });
    }
    stats
}

/// Fraction of positions where the predicted label equals the true label.
pub fn accuracy_score<L: PartialEq>(truth: &[L], predicted: &[L]) -> f64 {
    let total = truth.len().min(predicted.len());
    if total == 0 {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_score_counts_exact_matches() {
        assert_eq!(accuracy_score(&[1, 2, 3, 4], &[1, 2, 0, 0]), 0.5);
        assert_eq!(accuracy_score::<u8>(&[], &[]), 0.0);
    }

    #[test]
    fn confusion_matrix_agrees_with_accuracy_score() {
        let classes = ["a", "b", "c"];
        let truth = ["a", "b", "c", "c", "a"];
        let predicted = ["a", "c", "c", "c", "b"];
        let cm = ConfusionMatrix::from_labels(&classes, &truth, &predicted);
        assert_eq!(cm.get(2, 2), 2);
        assert_eq!(cm.get(1, 2), 1);
        let diagonal: u32 = (0..cm.n_classes).map(|k| cm.get(k, k)).sum();
        assert_eq!(
            diagonal as f64 / truth.len() as f64,
            accuracy_score(&truth, &predicted)
        );
    }

    #[test]
    fn precision_recall_per_class() {
        let mut cm = ConfusionMatrix::new(2);
        cm.add(0, 0);
        cm.add(0, 0);
        cm.add(0, 1);
        cm.add(1, 1);
        let stats = precision_recall_by_class(&cm);
        assert_eq!(stats[0].support, 3);
        assert!((stats[0].recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats[0].precision, 1.0);
        assert_eq!(stats[1].precision, 0.5);
        assert_eq!(stats[1].recall, 1.0);
    }
}
