// Logging
// File-backed tracing setup; the terminal belongs to the TUI

use anyhow::{Context, Result};
use std::fs;
use std::panic;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::core::app_config::LoggingSettings;

/// Environment variable holding a filter directive, e.g. `mirror_manager=debug`
pub const LOG_ENV_VAR: &str = "MIRROR_MANAGER_LOG";

/// Log file name inside the configured directory
pub const LOG_FILE_NAME: &str = "mirror-manager.log";

/// Build the filter from the environment, falling back to the configured level
pub fn build_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(&settings.level))
}

/// Install the global subscriber writing to the log file
///
/// Keep the returned guard alive until exit, or buffered lines are lost.
pub fn init(settings: &LoggingSettings) -> Result<WorkerGuard> {
    fs::create_dir_all(&settings.directory).with_context(|| {
        format!("Failed to create log directory: {}", settings.directory.display())
    })?;

    let appender = tracing_appender::rolling::never(&settings.directory, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(settings))
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}

/// Record every panic in the log
///
/// Worker panics are captured and reported as job failures, so only the
/// main thread falls through to the default hook and its stderr output.
pub fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let thread = std::thread::current();
        let name = thread.name().unwrap_or("<unnamed>");
        tracing::error!(thread = name, panic = %info, "panic");
        if name == "main" {
            default_hook(info);
        }
    }));
}
