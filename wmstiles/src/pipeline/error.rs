//! Pipeline errors

use thiserror::Error;

use super::summary::RunSummary;
use crate::provider::ProviderError;
use crate::store::StoreError;

/// Errors that end a run.
///
/// Individual tile failures are not errors; they are listed in the
/// [`RunSummary`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The fetcher could not be set up
    #[error("Failed to set up tile source: {0}")]
    Setup(#[from] ProviderError),

    /// Creating or writing the tile store failed
    #[error("Tile store error: {0}")]
    Store(#[from] StoreError),

    /// Tiles were planned but none could be downloaded
    #[error("No tiles were downloaded ({} of {} failed)", .summary.failed, .summary.planned)]
    NoTilesDownloaded { summary: RunSummary },

    /// The run was cancelled; completed tiles were kept
    #[error("Run cancelled after {} of {} tiles", .summary.completed(), .summary.planned)]
    Cancelled { summary: RunSummary },

    /// The writer task panicked or was aborted
    #[error("Writer task failed: {0}")]
    TaskFailed(String),
}

impl PipelineError {
    /// Summary of the run, when one was produced.
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            PipelineError::NoTilesDownloaded { summary } | PipelineError::Cancelled { summary } => {
                Some(summary)
            }
            _ => None,
        }
    }
}
