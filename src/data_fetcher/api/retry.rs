//! Retry budget and wait times for the fetch loop

use crate::constants::retry;
use crate::error::AppError;
use std::time::Duration;

/// How often and how long the fetch loop waits before giving up.
///
/// Built from [`crate::config::Config::retry_policy`] in production; tests
/// construct it directly with millisecond delays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Fixed wait after a timeout, connection error or 5xx.
    pub retry_delay: Duration,
    /// First wait after a 429; doubles with every further attempt.
    pub rate_limit_base: Duration,
    /// Cap for a single wait.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: retry::MAX_ATTEMPTS,
            retry_delay: Duration::from_secs(retry::RETRY_DELAY_SECONDS),
            rate_limit_base: Duration::from_secs(retry::RATE_LIMIT_BASE_SECONDS),
            max_backoff: Duration::from_secs(retry::MAX_BACKOFF_SECONDS),
        }
    }
}

impl RetryPolicy {
    /// Backoff after the `attempt`-th request (1-based) was rate limited:
    /// `rate_limit_base * 2^(attempt - 1)`, capped at `max_backoff`.
    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.rate_limit_base
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Wait before the next attempt after `error` ended attempt `attempt`.
    pub fn delay_for(&self, error: &AppError, attempt: u32) -> Duration {
        if error.is_rate_limit() {
            self.rate_limit_delay(attempt)
        } else {
            self.retry_delay
        }
    }

    /// Whether another attempt is allowed after attempt `attempt` failed.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
