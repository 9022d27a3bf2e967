//! Log output for digest runs.
//!
//! Progress for each document (segmentation, skips, ranking and report writing) goes to the
//! terminal and to a log file. Set `PERSONA_DIGEST_LOG_FILE` to choose the file; without it the
//! log lands in `logs/persona-digest.log` next to the working directory. File writes go through
//! a background worker.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_ENV: &str = "PERSONA_DIGEST_LOG_FILE";
const LOG_DIR: &str = "logs";
const LOG_FILE_NAME: &str = "persona-digest.log";

/// Install the global subscriber for a digest run.
///
/// `RUST_LOG` filters both outputs and defaults to `info`. When the log file cannot be opened
/// the run still logs to the terminal. Only the first call installs anything.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    let installed = if let Some(writer) = configure_file_writer() {
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact();

        registry.with(file_layer).try_init()
    } else {
        registry.try_init()
    };

    if let Err(err) = installed {
        eprintln!("Tracing subscriber already installed: {err}");
    }
}

/// Where the log file goes: `PERSONA_DIGEST_LOG_FILE` if set, else the default location.
fn log_file_path(configured: Option<String>) -> PathBuf {
    configured
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(LOG_DIR).join(LOG_FILE_NAME))
}

/// Open the log file for appending and hand it to a background writer.
fn configure_file_writer() -> Option<NonBlocking> {
    let path = log_file_path(std::env::var(LOG_FILE_ENV).ok());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    Some(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_defaults_under_logs_dir() {
        assert_eq!(log_file_path(None), Path::new("logs").join("persona-digest.log"));
        assert_eq!(log_file_path(Some("  ".into())), Path::new("logs").join("persona-digest.log"));
    }

    #[test]
    fn log_file_honors_override() {
        assert_eq!(
            log_file_path(Some("/tmp/digest.log".into())),
            PathBuf::from("/tmp/digest.log")
        );
    }
}
