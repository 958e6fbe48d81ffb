//! Pipeline lifecycle states.

use std::fmt;

/// Stage a run is in.
///
/// Runs move forward through `Planning`, `Fetching`, `Writing` and
/// `Finalizing` to `Done`. Any stage may end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Not started
    Idle,
    /// Computing the tile plan and preparing the store
    Planning,
    /// Tiles are being fetched and streamed to the writer
    Fetching,
    /// All fetches finished; the writer is flushing the last batch
    Writing,
    /// Building the run summary
    Finalizing,
    Done,
    Failed,
}

impl PipelineState {
    /// Whether the run has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Planning => "planning",
            PipelineState::Fetching => "fetching",
            PipelineState::Writing => "writing",
            PipelineState::Finalizing => "finalizing",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}
