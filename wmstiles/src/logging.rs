//! Logging infrastructure for WmsTiles.
//!
//! Provides structured logging with file output and optional console output:
//! - Writes to `<log_dir>/<log_file>` (cleared on session start)
//! - Optionally prints to stdout, e.g. when output is piped to a file
//! - Local RFC 3339 timestamps
//! - Configurable via RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize logging system.
///
/// Creates the log directory if needed, clears the previous log file and
/// installs the global subscriber.
///
/// # Arguments
///
/// * `log_dir` - Directory for log files
/// * `log_file` - Log filename (e.g., "wmstiles.log")
/// * `stdout_enabled` - Also log to stdout
/// * `debug` - Use the `debug` level regardless of RUST_LOG
///
/// # Returns
///
/// LoggingGuard that must be kept alive for logging to work
///
/// # Errors
///
/// Returns error if the log directory cannot be created, the log file cannot
/// be cleared, or a global subscriber is already installed.
pub fn init_logging(
    log_dir: &Path,
    log_file: &str,
    stdout_enabled: bool,
    debug: bool,
) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(log_dir)?;

    // Truncate the previous session's log
    fs::write(log_dir.join(log_file), "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_timer(LocalTime::rfc_3339())
        .with_target(true);

    let stdout_layer = stdout_enabled.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(false)
            .with_timer(LocalTime::rfc_3339())
            .with_target(false)
            .boxed()
    });

    tracing_subscriber::registry()
        .with(build_filter(debug))
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn build_filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("debug");
    }
    // Defaults to INFO if RUST_LOG is not set
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Default log file name.
pub fn default_log_file() -> &'static str {
    "wmstiles.log"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_log_file() {
        assert_eq!(default_log_file(), "wmstiles.log");
    }

    #[test]
    fn test_debug_filter_ignores_env() {
        let filter = build_filter(true);
        assert_eq!(filter.to_string(), "debug");
    }

    // Installs the global subscriber, so it is the only test that calls
    // init_logging.
    #[test]
    fn test_init_creates_and_clears_log_file() {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("nested/logs");
        fs::create_dir_all(&log_dir).unwrap();
        fs::write(log_dir.join("test.log"), "old log data").unwrap();

        let guard = init_logging(&log_dir, "test.log", false, false);

        assert!(guard.is_ok());
        let contents = fs::read_to_string(log_dir.join("test.log")).unwrap();
        assert!(!contents.contains("old log data"));
    }

    #[test]
    fn test_invalid_directory_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        // A regular file cannot be used as a directory
        let result = init_logging(&blocker.join("logs"), "test.log", false, false);
        assert!(result.is_err());
    }
}
