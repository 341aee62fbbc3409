//! Logging setup for the command line tools.
//!
//! The tools print their results on stdout (a submission path, histogram CSV,
//! best scores), so log records go to stderr and to a per-run log file under
//! `<app dir>/logs`. Colour is used only when stderr is a terminal.

use std::{
    ffi::OsString,
    fs::{self, OpenOptions},
    io::IsTerminal,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing::Subscriber;
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling,
};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*, registry::LookupSpan};

use crate::app_dirs;

/// Log files kept in the logs directory; older ones are removed at startup.
const MAX_LOG_FILES: usize = 10;
const LOG_FILE_PREFIX: &str = "kagglekit";
const DEFAULT_FILTER: &str = "info";

type Timer = fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>>;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("No suitable config directory available for logs")]
    NoBaseDir,
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to remove old log file {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log filename time: {0}")]
    FormatTime(#[from] time::error::Format),
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("Failed to create log file at {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<app_dirs::AppDirError> for LoggingError {
    fn from(error: app_dirs::AppDirError) -> Self {
        match error {
            app_dirs::AppDirError::NoBaseDir => LoggingError::NoBaseDir,
            app_dirs::AppDirError::CreateDir { path, source } => {
                LoggingError::CreateDir { path, source }
            }
        }
    }
}

/// Install the global subscriber: stderr plus a per-run log file.
///
/// Later calls are no-ops. On error nothing is installed and the caller keeps
/// running without logs.
pub fn init() -> Result<(), LoggingError> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    let log_dir = app_dirs::logs_dir()?;
    let (file_writer, guard, log_path) = open_log_file(&log_dir, now_local_or_utc())?;
    prune_old_logs(&log_dir, MAX_LOG_FILES)?;

    let timer = build_timer();
    let ansi = console_ansi(std::io::stderr().is_terminal(), std::env::var_os("NO_COLOR"));
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_timer(timer.clone())
        .with_writer(file_writer);

    let subscriber = Registry::default()
        .with(build_env_filter())
        .with(console_layer(timer, ansi))
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = LOG_GUARD.set(guard);

    tracing::debug!("Logging to {}", log_path.display());
    Ok(())
}

/// Current wall-clock time in the local offset, falling back to UTC.
pub(crate) fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn console_layer<S>(timer: Timer, ansi: bool) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(ansi)
        .with_timer(timer)
        .with_writer(std::io::stderr)
}

/// Colour only on an interactive stderr, and never when `NO_COLOR` is set.
fn console_ansi(stderr_is_terminal: bool, no_color: Option<OsString>) -> bool {
    stderr_is_terminal && no_color.is_none_or(|value| value.is_empty())
}

fn open_log_file(
    log_dir: &Path,
    now: OffsetDateTime,
) -> Result<(NonBlocking, WorkerGuard, PathBuf), LoggingError> {
    let file_name = format_log_file_name(now)?;
    let path = log_dir.join(&file_name);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::CreateLogFile {
            path: path.clone(),
            source,
        })?;
    let (writer, guard) = tracing_appender::non_blocking(rolling::never(log_dir, file_name));
    Ok((writer, guard, path))
}

fn is_own_log_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    name.starts_with(&format!("{LOG_FILE_PREFIX}_")) && name.ends_with(".log")
}

/// Remove the oldest `kagglekit_*.log` files until at most `max_files` remain.
fn prune_old_logs(dir: &Path, max_files: usize) -> Result<(), LoggingError> {
    let read_dir = fs::read_dir(dir).map_err(|source| LoggingError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut logs: Vec<(SystemTime, PathBuf)> = read_dir
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
        .map(|entry| entry.path())
        .filter(|path| is_own_log_file(path))
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .collect();

    logs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let excess = logs.len().saturating_sub(max_files);
    for (_, path) in logs.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::RemoveFile { path, source })?;
    }
    Ok(())
}

fn format_log_file_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    Ok(format!("{LOG_FILE_PREFIX}_{}.log", now.format(NAME_FORMAT)?))
}

fn build_timer() -> Timer {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, DISPLAY_FORMAT.into())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Duration};
    use tempfile::tempdir;

    #[test]
    fn log_filename_has_timestamp_and_prefix() {
        let fixed = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let name = format_log_file_name(fixed).unwrap();
        assert_eq!(name, "kagglekit_2023-11-14_22-13-20.log");
    }

    #[test]
    fn console_colour_needs_a_terminal() {
        assert!(console_ansi(true, None));
        assert!(!console_ansi(false, None));
        assert!(!console_ansi(true, Some(OsString::from("1"))));
        assert!(console_ansi(true, Some(OsString::new())));
    }

    #[test]
    fn open_log_file_creates_named_file() {
        let dir = tempdir().unwrap();
        let fixed = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let (_writer, _guard, path) = open_log_file(dir.path(), fixed).unwrap();
        assert_eq!(path, dir.path().join("kagglekit_2023-11-14_22-13-20.log"));
        assert!(path.is_file());
    }

    #[test]
    fn prune_keeps_newest_own_logs_only() {
        let dir = tempdir().unwrap();
        for idx in 0..12 {
            fs::write(dir.path().join(format!("kagglekit_{idx:02}.log")), "").unwrap();
            thread::sleep(Duration::from_millis(10));
        }
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();
        fs::write(dir.path().join("other.log"), "keep").unwrap();

        prune_old_logs(dir.path(), 10).unwrap();
        let own = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| is_own_log_file(&entry.path()))
            .count();
        assert_eq!(own, 10);
        assert!(!dir.path().join("kagglekit_00.log").exists());
        assert!(!dir.path().join("kagglekit_01.log").exists());
        assert!(dir.path().join("kagglekit_11.log").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("other.log").exists());
    }
}
