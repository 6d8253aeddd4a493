// Logging module
// Console output plus an optional daily log file, all through `tracing`.
//
// Levels used across mapview:
// - INFO  phase banners (asset loading, sector changes)
// - DEBUG per-file loads
// - TRACE per-record details
// - WARN  tolerated oddities in asset files

use std::path::Path;
use tracing_appender::rolling;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Map the numeric console level used on the command line to a filter directive
/// (0=Minimum, 1=Error, 2=Detail, 3=Full/Debug, 4=Trace)
pub fn map_log_level(level: i32) -> &'static str {
    match level {
        i32::MIN..=0 => "off",
        1 => "error",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

/// Initialize the logging system.
/// `RUST_LOG` wins over `log_level` when set. With `log_dir` a second,
/// non-ANSI layer writes `<log_dir>/<file_name>` rotated daily.
/// Fails when a global subscriber is already installed.
pub fn initialize_logging(
    log_dir: Option<&str>,
    log_level: &str,
    file_name: Option<&str>,
) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if let Some(dir) = log_dir {
        let path = Path::new(dir);
        let dir_error = if path.exists() {
            None
        } else {
            std::fs::create_dir_all(path).err()
        };

        let file_appender = rolling::daily(dir, file_name.unwrap_or("mapview.log"));
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // The guard flushes on drop; it has to live for the whole process
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .with(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(true),
            )
            .try_init()?;

        if let Some(err) = dir_error {
            tracing::warn!("Cannot create log directory {}: {}", dir, err);
        }
        Ok(())
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init()
    }
}

#[macro_export]
macro_rules! basic_log {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[macro_export]
macro_rules! detail_log {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => { tracing::trace!($($arg)*) };
}

#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => { tracing::error!($($arg)*) };
}
