//! Diagnostics setup
//!
//! Installs one subscriber with two outputs:
//! - the console, filtered by the `-v`/`-q` flags
//! - the log file, always at info level for this crate
//!
//! The file is written by a background worker. Keep the returned [`LogGuard`]
//! alive for the whole run; dropping it flushes and closes the file.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the log file writer alive
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    path: PathBuf,
    _worker: WorkerGuard,
}

impl LogGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Console filter for the given verbosity
pub fn console_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        // Only show errors
        return EnvFilter::new("error");
    }

    match verbose {
        0 => EnvFilter::new("ctrip_sights=info,warn"),
        1 => EnvFilter::new("ctrip_sights=debug,info"),
        2 => EnvFilter::new("ctrip_sights=trace,debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Installs the global subscriber
///
/// # Arguments
///
/// * `log_path` - File the log lines are appended to; created if missing
/// * `verbose` - Console verbosity (number of `-v` flags)
/// * `quiet` - Only errors on the console
///
/// # Errors
///
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init(log_path: &Path, verbose: u8, quiet: bool) -> Result<LogGuard> {
    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
    let (writer, worker) = tracing_appender::non_blocking(file);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(EnvFilter::new("ctrip_sights=info,warn"));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(console_filter(verbose, quiet));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(LogGuard {
        path: log_path.to_path_buf(),
        _worker: worker,
    })
}
