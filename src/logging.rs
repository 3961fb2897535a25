//! Tracing setup for the `tabeval` binary.
//!
//! Reports go to stdout, so log lines are written to stderr. Each run also
//! gets its own plain-text file under `<app dir>/logs`, named after the run's
//! start time. Only the newest [`MAX_LOG_FILES`] run logs are kept.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs;

/// Run logs retained in the log directory, including the current one.
pub const MAX_LOG_FILES: usize = 10;

/// Environment variable holding `EnvFilter` directives, e.g. `tabeval=debug`.
pub const LOG_FILTER_ENV: &str = "TABEVAL_LOG";

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_PREFIX: &str = "tabeval";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Log directory unavailable: {0}")]
    LogDir(#[from] app_dirs::AppDirError),
    #[error("Failed to scan log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to remove old run log {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create run log {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format run log name: {0}")]
    FormatTime(#[from] time::error::Format),
    #[error("Invalid TABEVAL_LOG directives: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("A global tracing subscriber is already installed: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the stderr + run-file subscriber.
///
/// Repeated calls are no-ops. On error nothing is installed and the caller
/// keeps running without logs.
pub fn init() -> Result<(), LoggingError> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    let filter = EnvFilter::try_new(filter_directives(std::env::var(LOG_FILTER_ENV).ok()))?;
    let log_dir = app_dirs::logs_dir()?;
    let log_path = prepare_run_log(&log_dir, now_local_or_utc(), MAX_LOG_FILES)?;
    let file_name = log_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    let (file_writer, guard) = tracing_appender::non_blocking(rolling::never(&log_dir, file_name));

    let timer = build_timer();
    let subscriber = Registry::default()
        .with(filter)
        .with(
            fmt::layer()
                .with_timer(timer.clone())
                .with_writer(std::io::stderr),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = LOG_GUARD.set(guard);

    tracing::debug!("Run log at {}", log_path.display());
    Ok(())
}

/// `EnvFilter` directives: the variable's value when set and non-blank, else `info`.
fn filter_directives(from_env: Option<String>) -> String {
    from_env
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Create this run's log file in `dir` and drop the oldest run logs so at most
/// `keep` remain, the new one included.
fn prepare_run_log(dir: &Path, started: OffsetDateTime, keep: usize) -> Result<PathBuf, LoggingError> {
    prune_old_logs(dir, keep.saturating_sub(1))?;
    let path = dir.join(run_log_name(started)?);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::CreateLogFile {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Remove the oldest `*.log` files in `dir` until at most `max_files` remain.
fn prune_old_logs(dir: &Path, max_files: usize) -> Result<(), LoggingError> {
    let mut logs: Vec<(SystemTime, PathBuf)> = fs::read_dir(dir)
        .map_err(|source| LoggingError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "log"))
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .collect();

    logs.sort();
    let excess = logs.len().saturating_sub(max_files);
    for (_, path) in logs.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::RemoveFile { path, source })?;
    }
    Ok(())
}

fn run_log_name(started: OffsetDateTime) -> Result<String, LoggingError> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    Ok(format!("{LOG_FILE_PREFIX}_{}.log", started.format(NAME_FORMAT)?))
}

fn build_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, DISPLAY_FORMAT.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Duration};
    use tempfile::tempdir;

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn run_log_is_named_after_start_time() {
        let started = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(run_log_name(started).unwrap(), "tabeval_2023-11-14_22-13-20.log");
    }

    #[test]
    fn filter_defaults_to_info_when_unset_or_blank() {
        assert_eq!(filter_directives(None), "info");
        assert_eq!(filter_directives(Some("  ".into())), "info");
        assert_eq!(filter_directives(Some("tabeval=debug".into())), "tabeval=debug");
        assert!(EnvFilter::try_new(filter_directives(None)).is_ok());
    }

    #[test]
    fn new_run_log_counts_toward_retention() {
        let dir = tempdir().unwrap();
        for idx in 0..4 {
            fs::write(dir.path().join(format!("tabeval_old{idx}.log")), "").unwrap();
            thread::sleep(Duration::from_millis(10));
        }
        fs::write(dir.path().join("tabeval.toml"), "[split]\n").unwrap();

        let started = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let path = prepare_run_log(dir.path(), started, 3).unwrap();
        assert!(path.is_file());
        assert_eq!(
            file_names(dir.path()),
            vec![
                "tabeval.toml",
                "tabeval_2023-11-14_22-13-20.log",
                "tabeval_old2.log",
                "tabeval_old3.log",
            ]
        );
    }

    #[test]
    fn pruning_an_empty_directory_is_a_no_op() {
        let dir = tempdir().unwrap();
        prune_old_logs(dir.path(), 0).unwrap();
        assert!(file_names(dir.path()).is_empty());
    }
}
