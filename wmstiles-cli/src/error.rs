//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and the process exit codes:
//!
//! - `0` success, including runs where some tiles failed
//! - `1` any fatal error (configuration, store, logging)
//! - `2` tiles were planned but none could be downloaded

use std::fmt;
use std::process;

use wmstiles::config::ConfigError;
use wmstiles::pipeline::PipelineError;
use wmstiles::store::StoreError;

/// Exit code for fatal errors.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code when no tile was downloaded.
pub const EXIT_NO_TILES: i32 = 2;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Dataset file could not be loaded
    Config(ConfigError),
    /// Command-line value rejected
    InvalidArgument(String),
    /// Pipeline setup or run failed
    Pipeline(PipelineError),
    /// Tile store could not be read
    Store(StoreError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Pipeline(PipelineError::NoTilesDownloaded { .. }) => EXIT_NO_TILES,
            _ => EXIT_FAILURE,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        if let CliError::Pipeline(e) = self {
            if let Some(summary) = e.summary() {
                println!();
                println!("{}", summary);
                println!();
            }
        }

        eprintln!("Error: {}", self);

        match self {
            CliError::Pipeline(PipelineError::NoTilesDownloaded { .. }) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. Layer name or year does not exist on the server");
                eprintln!("  2. Bounds lie outside the layer's coverage");
                eprintln!("     (the server answers with tiles below the size minimum)");
                eprintln!("  3. Server unreachable: check the url and your network connection");
            }
            CliError::Pipeline(PipelineError::Cancelled { .. }) => {
                eprintln!("Tiles completed before the interruption were kept.");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Pipeline(e) => write!(f, "{}", e),
            CliError::Store(e) => write!(f, "Failed to read tile store: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            CliError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}
