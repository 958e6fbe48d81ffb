//! Retry policy for tile requests.
//!
//! A [`RetryPolicy`] decides how many times a failed request is attempted
//! and how long to wait in between. Every failure kind (transport error,
//! HTTP status, timeout, undersized body) is treated as transient.

use std::time::Duration;

/// Default number of attempts per tile, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause after a failed attempt, in milliseconds.
///
/// For backoff this is the first pause; later ones double.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Upper bound for a single backoff pause.
pub const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(30);

/// Growth factor of backoff pauses.
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// How a tile request handles failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Single attempt.
    None,

    /// Same pause after every failure.
    Fixed { max_attempts: u32, delay: Duration },

    /// Pause starts at `initial_delay` and doubles after each failure, capped
    /// at [`MAX_BACKOFF_DELAY`].
    ExponentialBackoff {
        max_attempts: u32,
        initial_delay: Duration,
    },
}

impl Default for RetryPolicy {
    /// Three attempts, one second apart.
    fn default() -> Self {
        Self::fixed(
            DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        )
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::Fixed {
            max_attempts,
            delay,
        }
    }

    pub fn exponential(max_attempts: u32, initial_delay: Duration) -> Self {
        Self::ExponentialBackoff {
            max_attempts,
            initial_delay,
        }
    }

    /// Pause before retrying after `attempt` (1-based) failed, or `None`
    /// once the attempts are used up.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts() {
            return None;
        }
        match self {
            Self::None => None,
            Self::Fixed { delay, .. } => Some(*delay),
            Self::ExponentialBackoff { initial_delay, .. } => {
                let factor = BACKOFF_MULTIPLIER.saturating_pow(attempt - 1);
                let delay = initial_delay
                    .checked_mul(factor)
                    .unwrap_or(MAX_BACKOFF_DELAY);
                Some(delay.min(MAX_BACKOFF_DELAY))
            }
        }
    }

    /// Attempts per tile; a configured zero still allows the first attempt.
    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Fixed { max_attempts, .. } | Self::ExponentialBackoff { max_attempts, .. } => {
                (*max_attempts).max(1)
            }
        }
    }
}
