use std::fs;

use tabeval::config::{self, ClassifierKind, EvalConfig};
use tabeval::dataset::load_csv;
use tabeval::{evaluate_classifier, evaluate_regression};
use tempfile::tempdir;

fn write_table(rows: usize) -> String {
    let mut text = String::from("size,color,price,bought\n");
    for i in 0..rows {
        let size = (i % 20) as f64;
        let color = if i % 3 == 0 { "red" } else { "blue" };
        let price = 2.0 * size + if color == "red" { 5.0 } else { 0.0 };
        let bought = if size >= 10.0 { "yes" } else { "no" };
        text.push_str(&format!("{size},{color},{price},{bought}\n"));
    }
    text
}

#[test]
fn classifies_a_csv_table_with_configured_estimator() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("table.csv");
    fs::write(&data, write_table(120)).unwrap();
    let settings = dir.path().join("tabeval.toml");
    fs::write(&settings, "[split]\nseed = 3\nstratify = true\n").unwrap();

    let config = config::load_from(&settings).unwrap();
    let table = load_csv(&data, "bought").unwrap();
    assert_eq!(table.features.columns(), &["size", "color", "price"]);

    let mut clf = config.build_classifier::<String>();
    let report = evaluate_classifier(
        &table.features,
        &table.target,
        &"yes".to_string(),
        clf.as_mut(),
        &config.split,
    )
    .unwrap();
    assert_eq!(report.test_indices.len(), 40);
    assert!(report.accuracy > 0.9);
    assert!(report.auc.unwrap() > 0.9);
}

#[test]
fn logreg_kind_runs_end_to_end() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("table.csv");
    fs::write(&data, write_table(60)).unwrap();

    let mut config = EvalConfig::default();
    config.classifier.kind = ClassifierKind::Logreg;
    let table = load_csv(&data, "bought").unwrap();
    let mut clf = config.build_classifier::<String>();
    let report = evaluate_classifier(
        &table.features,
        &table.target,
        &"yes".to_string(),
        clf.as_mut(),
        &config.split,
    )
    .unwrap();
    assert_eq!(clf.name(), "logreg");
    assert!((0.0..=1.0).contains(&report.accuracy));
}

#[test]
fn regresses_a_numeric_csv_column() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("table.csv");
    fs::write(&data, write_table(100)).unwrap();

    let config = EvalConfig::default();
    let table = load_csv(&data, "price").unwrap();
    let y = table.numeric_target().unwrap();
    let mut reg = config.build_regressor();
    let report = evaluate_regression(&table.features, &y, reg.as_mut(), &config.split).unwrap();
    assert_eq!(report.predictions.len(), 33);
    assert!(report.r2 > 0.8);
}

#[test]
fn non_numeric_target_cannot_be_regressed() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("table.csv");
    fs::write(&data, write_table(10)).unwrap();
    let table = load_csv(&data, "bought").unwrap();
    assert!(table.numeric_target().is_err());
}
