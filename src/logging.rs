//! Process-wide logging setup.
//!
//! Called once from `main`. With file logging enabled, lines go to the
//! configured log file through a non-blocking writer; the returned guard
//! must be held until exit so buffered lines are flushed.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Filter directive applied when `RUST_LOG` is unset
fn default_directive(config: &LoggingConfig, verbose: bool) -> &str {
    if verbose {
        "debug"
    } else {
        config.level.as_str()
    }
}

/// Split a log file path into the directory and file name the appender wants
fn split_log_path(path: &Path) -> Result<(PathBuf, OsString)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Log file path {} has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name.to_os_string()))
}

/// Initialize the tracing subscriber for logging
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
    // RUST_LOG wins over the configured level (e.g. RUST_LOG=inventory_sync=trace)
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive(config, verbose))
            .with_context(|| format!("Invalid log level {:?}", config.level))?,
    };

    if !config.enabled {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr))
            .with(filter)
            .try_init()
            .context("Failed to install logger")?;
        return Ok(None);
    }

    let (dir, file_name) = split_log_path(&config.file)?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .try_init()
        .context("Failed to install logger")?;

    Ok(Some(guard))
}
