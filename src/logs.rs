//! Diagnostic logging.
//!
//! User facing output goes through the coloured console macros
//! ([`crate::info!`], [`crate::warning!`], ...). Everything else is emitted as
//! `tracing` events and written to a log file, so diagnostics never interleave
//! with the spinner and tables printed on the terminal.

use std::{fs::File, path::PathBuf, sync::Mutex};

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use crate::{config, error::Result};

/// Location of the log file, `<data_local_dir>/plcreator/plcreator.log`.
pub fn log_path() -> PathBuf {
    config::data_dir().join(format!("{}.log", config::APP_NAME))
}

/// Installs the global `tracing` subscriber and returns the log file path.
///
/// The file is truncated on every run. The level is taken from `RUST_LOG`
/// and defaults to `info`.
///
/// # Errors
///
/// Returns an error if the log file cannot be created.
pub fn init() -> Result<PathBuf> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_string()))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    if installed.is_err() {
        tracing::debug!("Global subscriber already installed");
    }

    Ok(path)
}
