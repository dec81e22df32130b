use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Prefix for the daily log files.
pub const LOG_PREFIX: &str = "haggle";

/// Setup logging to a daily rotating file plus the console.
///
/// The loader runs in the game's console window, so console output is always
/// on; the file copy is what users attach to bug reports.
///
/// # Arguments
/// * `log_dir` - Directory for log files (created if missing)
/// * `debug_mode` - If true, use debug level; otherwise use info level
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(log_dir: &Utf8Path, debug_mode: bool) -> Result<WorkerGuard> {
    ensure_log_dir(log_dir)?;

    let file_appender = rolling::daily(log_dir, LOG_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_ansi(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter(debug_mode))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!("Logging initialized: dir={}, debug={}", log_dir, debug_mode);

    Ok(guard)
}

/// Console-only logging, for when the log directory is unusable.
pub fn setup_console_logging(debug_mode: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(debug_mode))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .context("Failed to install tracing subscriber")
}

/// Setup logging, degrading to console output if file logging fails.
///
/// Logging problems never stop the loader.
///
/// # Returns
/// The file writer guard, or `None` when only console logging is active
pub fn setup_logging_or_console(log_dir: &Utf8Path, debug_mode: bool) -> Option<WorkerGuard> {
    match setup_logging(log_dir, debug_mode) {
        Ok(guard) => Some(guard),
        Err(e) => {
            // Fails only if a subscriber is already installed, which is fine
            let _ = setup_console_logging(debug_mode);
            tracing::warn!("File logging unavailable, logging to console only: {:#}", e);
            None
        }
    }
}

/// `RUST_LOG` wins when set; otherwise info, or debug in debug mode.
fn env_filter(debug_mode: bool) -> EnvFilter {
    let default_level = if debug_mode { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn ensure_log_dir(log_dir: &Utf8Path) -> Result<()> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }
    Ok(())
}
