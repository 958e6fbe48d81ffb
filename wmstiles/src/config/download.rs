//! Download configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::fetch::{
    RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_MIN_PAYLOAD_BYTES, DEFAULT_RETRY_DELAY_MS,
};
use crate::pool::DEFAULT_CONCURRENCY;
use crate::progress::DEFAULT_PROGRESS_INTERVAL;
use crate::provider::DEFAULT_TIMEOUT_SECS;
use crate::store::DEFAULT_BATCH_SIZE;

/// How the pause between attempts develops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backoff {
    /// Same pause every time
    #[default]
    Fixed,
    /// Pause doubles after each failure
    Exponential,
}

impl fmt::Display for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backoff::Fixed => write!(f, "fixed"),
            Backoff::Exponential => write!(f, "exponential"),
        }
    }
}

impl FromStr for Backoff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Backoff::Fixed),
            "exponential" => Ok(Backoff::Exponential),
            other => Err(format!("unknown backoff '{}'", other)),
        }
    }
}

/// Configuration for tile downloading and persistence.
///
/// # Example
///
/// ```
/// use wmstiles::config::DownloadConfig;
///
/// let config = DownloadConfig::default();
/// assert_eq!(config.timeout_secs(), 30);
/// assert_eq!(config.max_attempts(), 3);
/// assert_eq!(config.parallel_downloads(), 8);
///
/// let config = DownloadConfig::new()
///     .with_timeout_secs(60)
///     .with_parallel_downloads(16);
/// assert_eq!(config.parallel_downloads(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Per-request timeout (in seconds)
    timeout_secs: u64,
    /// Attempts per tile, including the first
    max_attempts: u32,
    /// Pause between attempts, or the first pause with backoff (in milliseconds)
    retry_delay_ms: u64,
    backoff: Backoff,
    /// Maximum number of concurrent requests
    parallel_downloads: usize,
    /// Smallest accepted response body
    min_payload_bytes: usize,
    /// Records per store transaction
    batch_size: usize,
    /// Completions between progress reports
    progress_interval: usize,
}

impl DownloadConfig {
    /// Create a new download configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = timeout;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_retry_delay_ms(mut self, delay: u64) -> Self {
        self.retry_delay_ms = delay;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_parallel_downloads(mut self, parallel: usize) -> Self {
        self.parallel_downloads = parallel;
        self
    }

    pub fn with_min_payload_bytes(mut self, min: usize) -> Self {
        self.min_payload_bytes = min;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn retry_delay_ms(&self) -> u64 {
        self.retry_delay_ms
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    pub fn parallel_downloads(&self) -> usize {
        self.parallel_downloads
    }

    pub fn min_payload_bytes(&self) -> usize {
        self.min_payload_bytes
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn progress_interval(&self) -> usize {
        self.progress_interval
    }

    /// Retry policy built from the attempt and backoff settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        let delay = Duration::from_millis(self.retry_delay_ms);
        match self.backoff {
            Backoff::Fixed => RetryPolicy::fixed(self.max_attempts, delay),
            Backoff::Exponential => RetryPolicy::exponential(self.max_attempts, delay),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            backoff: Backoff::Fixed,
            parallel_downloads: DEFAULT_CONCURRENCY,
            min_payload_bytes: DEFAULT_MIN_PAYLOAD_BYTES,
            batch_size: DEFAULT_BATCH_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}
