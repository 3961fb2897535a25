//! Where `tabeval` keeps its settings file and run logs.
//!
//! Everything lives in one `.tabeval` folder under the OS config directory,
//! or under `$TABEVAL_CONFIG_HOME` when that variable is set.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use directories::BaseDirs;
use thiserror::Error;

/// Folder created under the config base.
pub const APP_DIR_NAME: &str = ".tabeval";

/// Environment variable that replaces the OS config directory as the base.
pub const CONFIG_HOME_ENV: &str = "TABEVAL_CONFIG_HOME";

const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No config directory: set TABEVAL_CONFIG_HOME or a home directory")]
    NoBaseDir,
    #[error("Failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The `.tabeval` folder, created on first use.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = config_base(std::env::var_os(CONFIG_HOME_ENV)).ok_or(AppDirError::NoBaseDir)?;
    root_under(&base)
}

/// Run-log folder inside the `.tabeval` folder, created on first use.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    ensure_dir(app_root_dir()?.join(LOGS_DIR_NAME))
}

/// Base directory: a non-empty override wins over the OS config directory.
fn config_base(override_dir: Option<OsString>) -> Option<PathBuf> {
    match override_dir {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    }
}

fn root_under(base: &Path) -> Result<PathBuf, AppDirError> {
    ensure_dir(base.join(APP_DIR_NAME))
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    std::fs::create_dir_all(&path).map_err(|source| AppDirError::CreateDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
