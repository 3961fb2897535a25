use std::collections::BTreeSet;
use std::fmt::Debug;

use serde::Serialize;
use tracing::debug;

use super::{EvalError, check_aligned, check_prediction_count, check_probability_rows};
use crate::dataset::{FeatureTable, SplitOptions, stratified_split, train_test_split};
use crate::ml::metrics::{ConfusionMatrix, RocCurve, accuracy_score, roc_auc, roc_curve};
use crate::ml::{ClassProbabilities, Classifier};

/// Outcome of one classifier evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport<L> {
    /// Row indices of the test subset, in prediction order.
    pub test_indices: Vec<usize>,
    /// True labels of the test subset.
    pub truth: Vec<L>,
    /// Predicted labels of the test subset.
    pub predictions: Vec<L>,
    /// Class probabilities of the test subset, addressed by label.
    pub probabilities: ClassProbabilities<L>,
    /// Exact-match accuracy in `[0, 1]`.
    pub accuracy: f64,
    /// ROC AUC of the positive class; present only for binary targets.
    pub auc: Option<f64>,
    /// ROC curve of the positive class; present only for binary targets.
    pub roc: Option<RocCurve>,
}

impl<L: PartialEq + Clone> ClassificationReport<L> {
    /// Confusion matrix over the fitted classes (probability column order).
    pub fn confusion_matrix(&self) -> ConfusionMatrix {
        ConfusionMatrix::from_labels(self.probabilities.classes(), &self.truth, &self.predictions)
    }
}

/// Split `(x, y)`, fit `classifier` on the train subset and score it on the test subset.
///
/// AUC and ROC are computed against the probability of `pos_label` when `y`
/// has exactly two distinct values, and are `None` otherwise.
pub fn evaluate_classifier<L, C>(
    x: &FeatureTable,
    y: &[L],
    pos_label: &L,
    classifier: &mut C,
    options: &SplitOptions,
) -> Result<ClassificationReport<L>, EvalError>
where
    L: Ord + Clone + Debug,
    C: Classifier<L> + ?Sized,
{
    check_aligned(x.len(), y.len())?;
    let n_classes = y.iter().collect::<BTreeSet<_>>().len();
    if n_classes < 2 {
        return Err(EvalError::TooFewClasses(n_classes));
    }

    let split = if options.stratify {
        stratified_split(y, options)?
    } else {
        train_test_split(x.len(), options)?
    };
    let x_train = x.select(&split.train);
    let x_test = x.select(&split.test);
    let (y_train, y_test) = split.partition(y);
    debug!(
        estimator = classifier.name(),
        train = y_train.len(),
        test = y_test.len(),
        classes = n_classes,
        "Evaluating classifier"
    );

    classifier.fit(&x_train, &y_train)?;
    let probabilities = classifier.predict_proba(&x_test)?;
    check_prediction_count(x_test.len(), probabilities.len())?;
    check_probability_rows(probabilities.rows(), probabilities.classes().len())?;
    let predictions = classifier.predict(&x_test)?;
    check_prediction_count(x_test.len(), predictions.len())?;
    let accuracy = accuracy_score(&y_test, &predictions);

    let (auc, roc) = if n_classes == 2 {
        let scores = probabilities
            .column(pos_label)
            .ok_or_else(|| EvalError::UnknownPositiveLabel(format!("{pos_label:?}")))?;
        let curve = roc_curve(&y_test, &scores, pos_label)?;
        (Some(roc_auc(&curve)), Some(curve))
    } else {
        (None, None)
    };
    debug!(accuracy, auc = ?auc, "Classifier scored");

    Ok(ClassificationReport {
        test_indices: split.test,
        truth: y_test,
        predictions,
        probabilities,
        accuracy,
        auc,
        roc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::ModelError;
    use crate::ml::metrics::RocError;

    /// Predicts a fixed distribution regardless of input.
    struct FixedClassifier {
        classes: Vec<u8>,
        row: Vec<f64>,
    }

    impl Classifier<u8> for FixedClassifier {
        fn fit(&mut self, _x: &[Vec<f64>], _y: &[u8]) -> Result<(), ModelError> {
            Ok(())
        }

        fn classes(&self) -> &[u8] {
            &self.classes
        }

        fn predict_proba(&self, x: &[Vec<f64>]) -> Result<ClassProbabilities<u8>, ModelError> {
            Ok(ClassProbabilities::new(
                self.classes.clone(),
                vec![self.row.clone(); x.len()],
            ))
        }
    }

    fn table(rows: usize) -> FeatureTable {
        FeatureTable::from_rows((0..rows).map(|i| vec![i as f64]).collect()).unwrap()
    }

    #[test]
    fn single_class_target_is_rejected() {
        let mut clf = FixedClassifier {
            classes: vec![1],
            row: vec![1.0],
        };
        let y: [u8; 4] = [1, 1, 1, 1];
        let err = evaluate_classifier(&table(4), &y, &1, &mut clf, &SplitOptions::default())
            .unwrap_err();
        assert!(matches!(err, EvalError::TooFewClasses(1)));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut clf = FixedClassifier {
            classes: vec![0, 1],
            row: vec![0.5, 0.5],
        };
        let y: [u8; 2] = [0, 1];
        let err = evaluate_classifier(&table(3), &y, &1, &mut clf, &SplitOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            EvalError::LengthMismatch {
                rows: 3,
                targets: 2
            }
        ));
    }

    #[test]
    fn unknown_positive_label_is_rejected() {
        let mut clf = FixedClassifier {
            classes: vec![0, 1],
            row: vec![0.5, 0.5],
        };
        let y: Vec<u8> = (0..10).map(|i| (i % 2) as u8).collect();
        let err = evaluate_classifier(&table(10), &y, &7, &mut clf, &SplitOptions::default())
            .unwrap_err();
        assert!(matches!(err, EvalError::UnknownPositiveLabel(label) if label == "7"));
    }

    #[test]
    fn positive_column_is_found_by_label_not_position() {
        // Columns deliberately reversed relative to sorted label order.
        let mut clf = FixedClassifier {
            classes: vec![1, 0],
            row: vec![0.9, 0.1],
        };
        let y: Vec<u8> = (0..12).map(|i| (i % 2) as u8).collect();
        let options = SplitOptions {
            stratify: true,
            ..SplitOptions::default()
        };
        let report = evaluate_classifier(&table(12), &y, &1, &mut clf, &options).unwrap();
        assert!(report.predictions.iter().all(|&p| p == 1));
        // Constant scores give the diagonal.
        assert_eq!(report.auc, Some(0.5));
        assert_eq!(report.probabilities.column(&1).unwrap()[0], 0.9);
    }

    #[test]
    fn narrow_probability_rows_fail_the_call() {
        let mut clf = FixedClassifier {
            classes: vec![0, 1],
            row: vec![0.3],
        };
        let y: Vec<u8> = (0..10).map(|i| (i % 2) as u8).collect();
        let err = evaluate_classifier(&table(10), &y, &1, &mut clf, &SplitOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            EvalError::ProbabilityWidth {
                row: 0,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn unnormalized_probability_rows_fail_the_call() {
        let mut clf = FixedClassifier {
            classes: vec![0, 1],
            row: vec![0.3, 0.3],
        };
        let y: Vec<u8> = (0..10).map(|i| (i % 2) as u8).collect();
        let err = evaluate_classifier(&table(10), &y, &1, &mut clf, &SplitOptions::default())
            .unwrap_err();
        assert!(matches!(err, EvalError::ProbabilitySum { row: 0, .. }));

        clf.row = vec![f64::NAN, 1.0];
        let err = evaluate_classifier(&table(10), &y, &1, &mut clf, &SplitOptions::default())
            .unwrap_err();
        assert!(matches!(err, EvalError::ProbabilitySum { row: 0, .. }));
    }

    #[test]
    fn single_class_test_subset_has_no_roc() {
        let mut clf = FixedClassifier {
            classes: vec![0, 1],
            row: vec![0.5, 0.5],
        };
        let y: Vec<u8> = (0..10).map(|i| (i % 2) as u8).collect();
        let options = SplitOptions {
            test_size: 0.1,
            ..SplitOptions::default()
        };
        let err = evaluate_classifier(&table(10), &y, &1, &mut clf, &options).unwrap_err();
        assert!(matches!(err, EvalError::Roc(RocError::MissingClass { .. })));
    }

    #[test]
    fn multiclass_has_no_roc() {
        let mut clf = FixedClassifier {
            classes: vec![0, 1, 2],
            row: vec![0.2, 0.5, 0.3],
        };
        let y: Vec<u8> = (0..9).map(|i| (i % 3) as u8).collect();
        let report =
            evaluate_classifier(&table(9), &y, &1, &mut clf, &SplitOptions::default()).unwrap();
        assert_eq!(report.auc, None);
        assert_eq!(report.roc, None);
        let expected = report.truth.iter().filter(|&&t| t == 1).count() as f64
            / report.truth.len() as f64;
        assert_eq!(report.accuracy, expected);
        let cm = report.confusion_matrix();
        assert_eq!(cm.n_classes, 3);
    }
}
