//! Run summary.

use std::fmt;
use std::time::Duration;

use crate::fetch::FetchFailure;
use crate::progress::format_duration;

/// Failed tiles listed by the `Display` output before it abbreviates.
pub const MAX_LISTED_FAILURES: usize = 20;

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Tiles in the plan
    pub planned: usize,
    /// Tiles fetched and written
    pub downloaded: usize,
    /// Tiles that failed after all attempts
    pub failed: usize,
    /// Failures in completion order
    pub failed_tiles: Vec<FetchFailure>,
    /// Payload bytes written to the store
    pub bytes_written: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Tiles that reached a final outcome.
    pub fn completed(&self) -> usize {
        self.downloaded + self.failed
    }

    /// Tiles never attempted, e.g. after cancellation.
    pub fn skipped(&self) -> usize {
        self.planned.saturating_sub(self.completed())
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0 && self.downloaded == self.planned
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Planned:    {} tiles", self.planned)?;
        writeln!(f, "Downloaded: {} tiles", self.downloaded)?;
        writeln!(f, "Failed:     {} tiles", self.failed)?;
        if self.skipped() > 0 {
            writeln!(f, "Skipped:    {} tiles", self.skipped())?;
        }
        writeln!(f, "Written:    {:.2} MB", self.bytes_written as f64 / 1_048_576.0)?;
        write!(f, "Elapsed:    {}", format_duration(self.elapsed))?;

        if !self.failed_tiles.is_empty() {
            write!(f, "\nFailed tiles:")?;
            for failure in self.failed_tiles.iter().take(MAX_LISTED_FAILURES) {
                write!(f, "\n  {}", failure)?;
            }
            let rest = self.failed_tiles.len().saturating_sub(MAX_LISTED_FAILURES);
            if rest > 0 {
                write!(f, "\n  ... and {} more", rest)?;
            }
        }
        Ok(())
    }
}
