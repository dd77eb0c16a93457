//! Shared logging utilities for promptforge binaries.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "promptforge=info,promptforge_core=info";
const HOME_ENV_VAR: &str = "PROMPTFORGE_HOME";
const HOME_DIR_NAME: &str = ".promptforge";
const MAX_LOG_FILES: usize = 5;

/// Logging configuration shared by promptforge binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Mirror the file filter on stderr instead of warnings only.
    pub verbose: bool,
}

/// Initialize tracing with a daily log file and stderr output.
///
/// Console output always goes to stderr so stdout stays clean for command
/// results (including `--json` payloads). Keep the returned guard alive until
/// exit or buffered file lines are lost.
pub fn init_logging(config: LogConfig<'_>) -> Result<WorkerGuard> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(&log_dir, config.app_name)?);

    let console_filter = if config.verbose {
        env_or_default_filter()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(env_or_default_filter()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn env_or_default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// `<app>.<date>.log` files in `dir`, rotated daily, newest five kept.
fn file_appender(dir: &Path, app_name: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(sanitize_name(app_name))
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .with_context(|| format!("Failed to open log file for {}", app_name))
}

/// Get the promptforge home directory: ~/.promptforge
///
/// `PROMPTFORGE_HOME` overrides the location. Falls back to a relative
/// `.promptforge` when no home directory can be determined.
pub fn promptforge_home() -> PathBuf {
    if let Ok(override_path) = std::env::var(HOME_ENV_VAR) {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .map(|home| home.join(HOME_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(HOME_DIR_NAME))
}

/// Get the config file path: ~/.promptforge/config.toml
pub fn config_path() -> PathBuf {
    promptforge_home().join("config.toml")
}

/// Get the logs directory: ~/.promptforge/logs
pub fn logs_dir() -> PathBuf {
    promptforge_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}
