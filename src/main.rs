//! Evaluate a built-in classifier or regressor on a CSV table.

use std::path::PathBuf;

use tabeval::config::{self, ClassifierKind, EvalConfig};
use tabeval::dataset::load_csv;
use tabeval::ml::metrics::precision_recall_by_class;
use tabeval::{ClassificationReport, RegressionReport, evaluate_classifier, evaluate_regression};
use tracing::info;

fn main() {
    if let Err(err) = tabeval::logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Classify,
    Regress,
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    task: Task,
    data: PathBuf,
    target: String,
    config_path: Option<PathBuf>,
    save_config: Option<PathBuf>,
    test_size: Option<f64>,
    seed: Option<u64>,
    stratify: bool,
    pos_label: String,
    kind: Option<ClassifierKind>,
    json: bool,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let config = effective_config(&options)?;
    if let Some(path) = &options.save_config {
        config::save_to(path, &config).map_err(|err| err.to_string())?;
        info!("Saved settings to {}", path.display());
    }

    let table = load_csv(&options.data, &options.target).map_err(|err| err.to_string())?;
    info!(
        rows = table.features.len(),
        features = table.features.width(),
        target_column = %table.target_name,
        "Loaded {}",
        options.data.display()
    );
    for (column, values) in &table.categories {
        info!(
            column = %column,
            codes = values.len(),
            "Ordinal-encoded column: {}",
            values.join(", ")
        );
    }

    match options.task {
        Task::Classify => {
            let mut classifier = config.build_classifier::<String>();
            let report = evaluate_classifier(
                &table.features,
                &table.target,
                &options.pos_label,
                classifier.as_mut(),
                &config.split,
            )
            .map_err(|err| err.to_string())?;
            info!(accuracy = report.accuracy, auc = ?report.auc, "Classifier evaluated");
            if options.json {
                print_json(&report)?;
            } else {
                print_classification(&report);
            }
        }
        Task::Regress => {
            let y = table.numeric_target().map_err(|err| err.to_string())?;
            let mut regressor = config.build_regressor();
            let report =
                evaluate_regression(&table.features, &y, regressor.as_mut(), &config.split)
                    .map_err(|err| err.to_string())?;
            info!(rmse = report.rmse, mae = report.mae, r2 = report.r2, "Regressor evaluated");
            if options.json {
                print_json(&report)?;
            } else {
                print_regression(&report);
            }
        }
    }
    Ok(())
}

/// Settings file (explicit path or app default) overlaid with command-line flags.
fn effective_config(options: &CliOptions) -> Result<EvalConfig, String> {
    let mut config = match &options.config_path {
        Some(path) => config::load_from(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())?;
    if let Some(test_size) = options.test_size {
        config.split.test_size = test_size;
    }
    if let Some(seed) = options.seed {
        config.split.seed = seed;
    }
    if options.stratify {
        config.split.stratify = true;
    }
    if let Some(kind) = options.kind {
        config.classifier.kind = kind;
    }
    Ok(config)
}

fn print_json<T: serde::Serialize>(report: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(report).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

fn print_classification(report: &ClassificationReport<String>) {
    let classes = report.probabilities.classes();
    println!("test rows: {}", report.test_indices.len());
    println!("accuracy: {:.4}", report.accuracy);
    match (&report.auc, &report.roc) {
        (Some(auc), Some(roc)) => println!("auc: {:.4}  (roc points: {})", auc, roc.len()),
        _ => println!("auc: n/a (target is not binary)"),
    }
    let cm = report.confusion_matrix();
    for (idx, stats) in precision_recall_by_class(&cm).iter().enumerate() {
        println!(
            "class {:>2} {:<16}  precision={:.3}  recall={:.3}  support={}",
            idx, classes[idx], stats.precision, stats.recall, stats.support
        );
    }
    println!("confusion matrix (rows=true, cols=pred):");
    for truth in 0..cm.n_classes {
        let mut row = String::new();
        for pred in 0..cm.n_classes {
            row.push_str(&format!("{:6}", cm.get(truth, pred)));
        }
        println!("{row}");
    }
}

fn print_regression(report: &RegressionReport) {
    println!("test rows: {}", report.test_indices.len());
    println!("rmse: {:.4}", report.rmse);
    println!("mae: {:.4}", report.mae);
    println!("r2: {:.4}", report.r2);
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut args = args.into_iter();
    let task = match args.next().as_deref() {
        Some("classify") => Task::Classify,
        Some("regress") => Task::Regress,
        Some("-h") | Some("--help") | None => return Err(help_text()),
        Some(other) => return Err(format!("Unknown command: {other}\n\n{}", help_text())),
    };

    let mut data: Option<PathBuf> = None;
    let mut target: Option<String> = None;
    let mut config_path = None;
    let mut save_config = None;
    let mut test_size = None;
    let mut seed = None;
    let mut stratify = false;
    let mut pos_label = "1".to_string();
    let mut kind = None;
    let mut json = false;

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match arg.as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--data" => data = Some(PathBuf::from(value("--data")?)),
            "--target" => target = Some(value("--target")?),
            "--config" => config_path = Some(PathBuf::from(value("--config")?)),
            "--save-config" => save_config = Some(PathBuf::from(value("--save-config")?)),
            "--test-size" => {
                let raw = value("--test-size")?;
                test_size = Some(
                    raw.parse::<f64>()
                        .map_err(|_| format!("Invalid --test-size value: {raw}"))?,
                );
            }
            "--seed" => {
                let raw = value("--seed")?;
                seed = Some(
                    raw.parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {raw}"))?,
                );
            }
            "--stratify" => stratify = true,
            "--pos-label" => pos_label = value("--pos-label")?,
            "--kind" => {
                let raw = value("--kind")?;
                kind = Some(match raw.as_str() {
                    "gbdt" => ClassifierKind::Gbdt,
                    "logreg" => ClassifierKind::Logreg,
                    _ => return Err(format!("Invalid --kind value: {raw}")),
                });
            }
            "--json" => json = true,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
    }

    Ok(CliOptions {
        task,
        data: data.ok_or_else(|| "--data is required".to_string())?,
        target: target.ok_or_else(|| "--target is required".to_string())?,
        config_path,
        save_config,
        test_size,
        seed,
        stratify,
        pos_label,
        kind,
        json,
    })
}

fn help_text() -> String {
    [
        "tabeval",
        "",
        "Usage:",
        "  tabeval classify --data <table.csv> --target <column> [options]",
        "  tabeval regress  --data <table.csv> --target <column> [options]",
        "",
        "Options:",
        "  --config <file.toml>       Settings file (default: <app dir>/tabeval.toml).",
        "  --save-config <file.toml>  Write the effective settings before running.",
        "  --test-size <f>            Test fraction in (0, 1) (default: 0.33).",
        "  --seed <n>                 Split seed (default: 42).",
        "  --stratify                 Keep class proportions in both subsets.",
        "  --pos-label <label>        Positive class for AUC/ROC (default: 1).",
        "  --kind <gbdt|logreg>       Classifier type (default: gbdt).",
        "  --json                     Print the full report as JSON.",
    ]
    .join("\n")
}
