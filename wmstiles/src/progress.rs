//! Progress reporting.
//!
//! The [`ProgressReporter`] is fed one event per finished tile by the
//! pipeline's consumer. Every `interval` completions, and once more at the
//! end, it hands a [`ProgressSnapshot`] to a [`ProgressSink`]. It is purely
//! observational and never influences the run.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::info;

/// Default number of completions between reports.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 500;

/// Point-in-time view of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Completion percentage, 100 for an empty run.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    /// Completed tiles per second.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.completed as f64 / secs
    }

    /// Estimated time until all tiles are completed.
    ///
    /// `None` until a throughput can be measured.
    pub fn eta(&self) -> Option<Duration> {
        let remaining = self.total.saturating_sub(self.completed);
        if remaining == 0 {
            return Some(Duration::ZERO);
        }
        let rate = self.throughput();
        if rate <= 0.0 {
            return None;
        }
        Some(Duration::from_secs_f64(remaining as f64 / rate))
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} tiles ({:.1}%), {:.1} tiles/s, ETA {}",
            self.completed,
            self.total,
            self.percent(),
            self.throughput(),
            self.eta()
                .map(format_duration)
                .unwrap_or_else(|| "unknown".to_string())
        )
    }
}

/// Formats a duration as `1h02m03s`, `2m03s` or `3s`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h{:02}m{:02}s", h, m, s)
    } else if m > 0 {
        format!("{}m{:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}

/// Receives progress snapshots.
pub trait ProgressSink: Send + Sync {
    fn report(&self, snapshot: &ProgressSnapshot);
}

/// Logs snapshots through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn report(&self, snapshot: &ProgressSnapshot) {
        info!(
            completed = snapshot.completed,
            total = snapshot.total,
            succeeded = snapshot.succeeded,
            failed = snapshot.failed,
            "Progress: {}",
            snapshot
        );
    }
}

/// Counts completions and emits periodic snapshots.
pub struct ProgressReporter {
    total: usize,
    interval: usize,
    started: Instant,
    completed: usize,
    succeeded: usize,
    failed: usize,
    last_reported: Option<usize>,
    sink: Box<dyn ProgressSink>,
}

impl ProgressReporter {
    /// Creates a reporter for `total` tiles, reporting every `interval`.
    ///
    /// An interval of zero disables periodic reports; the final report is
    /// still emitted.
    pub fn new(total: usize, interval: usize, sink: Box<dyn ProgressSink>) -> Self {
        Self {
            total,
            interval,
            started: Instant::now(),
            completed: 0,
            succeeded: 0,
            failed: 0,
            last_reported: None,
            sink,
        }
    }

    /// Records one finished tile.
    pub fn record(&mut self, success: bool) {
        self.completed += 1;
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        if self.interval > 0 && self.completed % self.interval == 0 {
            self.emit();
        }
    }

    /// Emits the final snapshot unless the last one already covered it.
    pub fn finish(&mut self) {
        if self.last_reported != Some(self.completed) {
            self.emit();
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed,
            total: self.total,
            succeeded: self.succeeded,
            failed: self.failed,
            elapsed: self.started.elapsed(),
        }
    }

    fn emit(&mut self) {
        let snapshot = self.snapshot();
        self.sink.report(&snapshot);
        self.last_reported = Some(self.completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CollectingSink(Arc<Mutex<Vec<ProgressSnapshot>>>);

    impl ProgressSink for CollectingSink {
        fn report(&self, snapshot: &ProgressSnapshot) {
            self.0.lock().unwrap().push(*snapshot);
        }
    }

    fn snapshot(completed: usize, total: usize, secs: u64) -> ProgressSnapshot {
        ProgressSnapshot {
            completed,
            total,
            succeeded: completed,
            failed: 0,
            elapsed: Duration::from_secs(secs),
        }
    }

    #[test]
    fn test_snapshot_arithmetic() {
        let s = snapshot(250, 1000, 10);
        assert!((s.percent() - 25.0).abs() < 1e-9);
        assert!((s.throughput() - 25.0).abs() < 1e-9);
        assert_eq!(s.eta(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_eta_unknown_without_elapsed_time() {
        let s = snapshot(0, 10, 0);
        assert_eq!(s.throughput(), 0.0);
        assert_eq!(s.eta(), None);
    }

    #[test]
    fn test_eta_zero_when_done() {
        assert_eq!(snapshot(10, 10, 0).eta(), Some(Duration::ZERO));
        assert_eq!(snapshot(0, 0, 0).percent(), 100.0);
    }

    #[test]
    fn test_reports_every_interval_and_at_end() {
        let sink = CollectingSink::default();
        let mut reporter = ProgressReporter::new(7, 3, Box::new(sink.clone()));
        for i in 0..7 {
            reporter.record(i != 4);
        }
        reporter.finish();

        let reports = sink.0.lock().unwrap();
        let counts: Vec<usize> = reports.iter().map(|s| s.completed).collect();
        assert_eq!(counts, vec![3, 6, 7]);
        let last = reports.last().unwrap();
        assert_eq!(last.succeeded, 6);
        assert_eq!(last.failed, 1);
    }

    #[test]
    fn test_final_report_not_duplicated() {
        let sink = CollectingSink::default();
        let mut reporter = ProgressReporter::new(4, 2, Box::new(sink.clone()));
        for _ in 0..4 {
            reporter.record(true);
        }
        reporter.finish();
        assert_eq!(sink.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m05s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h02m03s");
    }

    #[test]
    fn test_display() {
        let s = snapshot(250, 1000, 10);
        assert_eq!(s.to_string(), "250/1000 tiles (25.0%), 25.0 tiles/s, ETA 30s");
    }
}
