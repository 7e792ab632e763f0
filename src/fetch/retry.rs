//! Retry policy with exponential backoff for failed feed requests.
//!
//! The fetch protocol treats every request failure as transient, so the
//! policy only has to answer one question: given that attempt `k` just
//! failed, is there budget left, and how long to wait before attempt `k+1`.
//!
//! Delays grow as `base * 2^(k-1)` (1s, 2s, 4s, ... with the default base),
//! capped at `max_delay`. The schedule is deterministic: callers that need
//! smearing can widen the inter-request delay on the pacer instead.

use std::time::Duration;

use tracing::debug;

/// Default maximum attempts per date (including the initial attempt).
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default base delay for the first retry.
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default cap on a single backoff delay.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Decision on whether to attempt a failed date again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the given delay.
    Retry {
        /// How long to wait before the next attempt.
        delay: Duration,
        /// The attempt number about to run (1-indexed).
        attempt: u32,
    },

    /// Attempt budget exhausted; surface the last error as a failure.
    GiveUp {
        /// Human-readable reason.
        reason: String,
    },
}

/// Bounded exponential-backoff retry configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with explicit settings.
    ///
    /// `max_attempts` is clamped to at least 1: every date gets one attempt.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Creates a policy with a custom attempt bound and default delays.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the configured attempt bound.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides what to do after attempt `attempt` (1-indexed) has failed.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "attempt budget exhausted");
            return RetryDecision::GiveUp {
                reason: format!("all {} attempts failed", self.max_attempts),
            };
        }

        let delay = self.backoff_delay(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );
        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Backoff before the attempt following failed attempt `attempt`.
    ///
    /// Attempt 1 waits `base`, attempt 2 waits `2 * base`, and so on,
    /// capped at `max_delay`.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}
