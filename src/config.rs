//! TOML settings for evaluation runs.
//!
//! Every key is optional; missing keys take their defaults and loaded values
//! are clamped into usable ranges.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;
use crate::dataset::SplitOptions;
use crate::ml::gbdt_stump::{self, GbdtStumpClassifier, GbdtStumpRegressor};
use crate::ml::logreg::{self, LogRegClassifier};
use crate::ml::{Classifier, Regressor};

/// File name of the settings file inside the app directory.
pub const CONFIG_FILE_NAME: &str = "tabeval.toml";

/// Errors that may occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write a config file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to serialize config to TOML.
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    /// No usable config directory found.
    #[error("No suitable config directory found: {0}")]
    NoConfigDir(#[from] app_dirs::AppDirError),
}

/// Settings for one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub split: SplitOptions,
    pub classifier: ClassifierConfig,
    pub regressor: RegressorConfig,
}

/// Which built-in classifier to fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    Gbdt,
    Logreg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub kind: ClassifierKind,
    /// Boosting rounds (`gbdt`).
    pub rounds: usize,
    pub learning_rate: f64,
    /// Split-search bins (`gbdt`).
    pub bins: usize,
    /// Passes over the training set (`logreg`).
    pub epochs: usize,
    /// L2 penalty (`logreg`).
    pub l2: f64,
    /// Mini-batch size (`logreg`).
    pub batch_size: usize,
    /// Reweight classes by inverse frequency (`logreg`).
    pub balance_classes: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Gbdt,
            rounds: 100,
            learning_rate: 0.1,
            bins: 32,
            epochs: 50,
            l2: 1e-4,
            batch_size: 32,
            balance_classes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressorConfig {
    pub rounds: usize,
    pub learning_rate: f64,
    pub bins: usize,
}

impl Default for RegressorConfig {
    fn default() -> Self {
        Self {
            rounds: 100,
            learning_rate: 0.1,
            bins: 32,
        }
    }
}

impl EvalConfig {
    /// Clamp model settings into usable ranges.
    ///
    /// `split.test_size` is left untouched so an out-of-range value surfaces as
    /// a split error instead of being silently corrected.
    pub fn normalized(mut self) -> Self {
        let defaults = ClassifierConfig::default();
        let clf = &mut self.classifier;
        clf.bins = clf.bins.clamp(2, 256);
        if !(clf.learning_rate.is_finite() && clf.learning_rate > 0.0) {
            clf.learning_rate = defaults.learning_rate;
        }
        if !(clf.l2.is_finite() && clf.l2 >= 0.0) {
            clf.l2 = defaults.l2;
        }
        clf.batch_size = clf.batch_size.max(1);

        let reg = &mut self.regressor;
        reg.bins = reg.bins.clamp(2, 256);
        if !(reg.learning_rate.is_finite() && reg.learning_rate > 0.0) {
            reg.learning_rate = RegressorConfig::default().learning_rate;
        }
        self
    }

    /// Build the configured classifier. `logreg` reuses the split seed.
    pub fn build_classifier<L: Ord + Clone + 'static>(&self) -> Box<dyn Classifier<L>> {
        let clf = &self.classifier;
        match clf.kind {
            ClassifierKind::Gbdt => Box::new(GbdtStumpClassifier::new(gbdt_stump::TrainOptions {
                rounds: clf.rounds,
                learning_rate: clf.learning_rate,
                bins: clf.bins,
            })),
            ClassifierKind::Logreg => Box::new(LogRegClassifier::new(logreg::TrainOptions {
                epochs: clf.epochs,
                learning_rate: clf.learning_rate,
                l2: clf.l2,
                batch_size: clf.batch_size,
                seed: self.split.seed,
                balance_classes: clf.balance_classes,
            })),
        }
    }

    pub fn build_regressor(&self) -> Box<dyn Regressor> {
        Box::new(GbdtStumpRegressor::new(gbdt_stump::TrainOptions {
            rounds: self.regressor.rounds,
            learning_rate: self.regressor.learning_rate,
            bins: self.regressor.bins,
        }))
    }
}

/// Default settings path inside the app directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Load settings from the default path, returning defaults if missing.
pub fn load_or_default() -> Result<EvalConfig, ConfigError> {
    load_from(&config_path()?)
}

/// Load settings from `path`, returning defaults if the file does not exist.
pub fn load_from(path: &Path) -> Result<EvalConfig, ConfigError> {
    if !path.exists() {
        return Ok(EvalConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: EvalConfig = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(config.normalized())
}

/// Write settings to `path` as pretty TOML.
pub fn save_to(path: &Path, config: &EvalConfig) -> Result<(), ConfigError> {
    let data = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
