use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Environment variable holding the tracing filter directive.
pub const LOG_LEVEL_ENV: &str = "AMI_CLEANUP_LOG_LEVEL";

/// Install a file-backed subscriber. The terminal is owned by the UI, so
/// nothing is logged to stdout or stderr. Keep the guard alive until exit
/// or buffered lines are lost.
pub fn init(log_file: &Path) -> Result<WorkerGuard, AppError> {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .ok_or_else(|| AppError::Logging(format!("{} is not a file path", log_file.display())))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .with_ansi(false)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    Ok(guard)
}
