mod support;

use support::synthetic::linear;
use tabeval::ml::gbdt_stump::GbdtStumpRegressor;
use tabeval::{EvalError, FeatureTable, SplitOptions, evaluate_regression};

#[test]
fn linear_target_is_learned() {
    let (x, y) = linear(100, 11);
    let mut reg = GbdtStumpRegressor::default();
    let report = evaluate_regression(&x, &y, &mut reg, &SplitOptions::default()).unwrap();

    assert_eq!(report.predictions.len(), 33);
    assert_eq!(report.truth.len(), 33);
    assert!(report.rmse >= 0.0);
    assert!(report.mae >= 0.0);
    assert!(report.mae <= report.rmse + 1e-12);
    assert!(report.r2 <= 1.0);
    assert!(report.r2 > 0.7);
}

#[test]
fn constant_target_with_exact_fit_scores_perfectly() {
    let (x, _) = linear(30, 12);
    let y = vec![5.0; 30];
    let mut reg = GbdtStumpRegressor::default();
    let report = evaluate_regression(&x, &y, &mut reg, &SplitOptions::default()).unwrap();
    assert!(report.predictions.iter().all(|&p| p == 5.0));
    assert_eq!(report.rmse, 0.0);
    assert_eq!(report.mae, 0.0);
    assert_eq!(report.r2, 1.0);
}

#[test]
fn same_seed_reproduces_the_report() {
    let (x, y) = linear(50, 13);
    let options = SplitOptions {
        seed: 5,
        ..SplitOptions::default()
    };
    let first = evaluate_regression(&x, &y, &mut GbdtStumpRegressor::default(), &options).unwrap();
    let second = evaluate_regression(&x, &y, &mut GbdtStumpRegressor::default(), &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn invalid_targets_fail_the_call() {
    let x = FeatureTable::from_rows(vec![vec![1.0]; 4]).unwrap();
    let mut reg = GbdtStumpRegressor::default();

    let err = evaluate_regression(&x, &[1.0, 2.0, f64::NAN, 4.0], &mut reg, &SplitOptions::default())
        .unwrap_err();
    assert!(matches!(err, EvalError::NonFiniteTarget(2)));

    let err = evaluate_regression(&x, &[1.0, 2.0], &mut reg, &SplitOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        EvalError::LengthMismatch {
            rows: 4,
            targets: 2
        }
    ));

    let empty = FeatureTable::from_rows(Vec::new()).unwrap();
    let err = evaluate_regression(&empty, &[], &mut reg, &SplitOptions::default()).unwrap_err();
    assert!(matches!(err, EvalError::EmptyDataset));
}
