//! CLI runner for common setup.
//!
//! Encapsulates logging initialization for commands that talk to the
//! network.

use std::path::PathBuf;

use tracing::info;
use wmstiles::logging::{default_log_file, init_logging, LoggingGuard};

use crate::error::CliError;

/// Runner that manages the CLI logging lifecycle.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    log_dir: PathBuf,
}

impl CliRunner {
    /// Create a new CLI runner with optional debug logging.
    ///
    /// Stdout logging is only enabled when stdout is not a TTY, so that
    /// interactive runs show the summary without interleaved log lines.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging regardless of RUST_LOG
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        let log_dir = log_dir();
        let stdout_enabled = !atty::is(atty::Stream::Stdout);

        let logging_guard = init_logging(&log_dir, default_log_file(), stdout_enabled, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            log_dir,
        })
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("WmsTiles v{}", wmstiles::VERSION);
        info!("WmsTiles CLI: {} command", command);
    }

    /// Full path of the session log file.
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(default_log_file())
    }
}

/// Log directory under the user's local data directory.
///
/// Falls back to `./logs` when no data directory is known.
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("wmstiles").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_ends_with_app_logs() {
        let dir = log_dir();
        assert!(dir.ends_with("logs"));
    }
}
