//! Tile store errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the tile store.
///
/// Any store error is fatal for a run.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to remove previous store file '{path}': {source}")]
    Reset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create store directory '{path}': {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file '{0}' does not exist")]
    NotFound(PathBuf),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
