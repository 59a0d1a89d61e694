use crate::utils::app_paths::AppPaths;
use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Initialize tracing, writing to a timestamped log file.
///
/// The terminal belongs to the table view, so nothing is ever logged to
/// stdout or stderr. `RUST_LOG` overrides `default_level`. Returns the path
/// of the new log file.
pub fn init_tracing(default_level: &str) -> Result<PathBuf> {
    init_tracing_in(&AppPaths::log_dir(), default_level)
}

pub fn init_tracing_in(log_dir: &Path, default_level: &str) -> Result<PathBuf> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("tabview_{}.log", timestamp));
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    #[cfg(unix)]
    {
        let latest_path = log_dir.join("latest.log");
        let _ = fs::remove_file(&latest_path);
        let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
    }

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .compact();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Tracing was already initialized")?;

    tracing::info!(target: "system", "Logging to {}", log_path.display());
    Ok(log_path)
}
