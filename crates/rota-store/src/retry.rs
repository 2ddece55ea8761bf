//! Bounded retry with exponential backoff for store calls.
//!
//! The external store is rate-limited, so every fetch/append goes
//! through a [`RetryPolicy`]: a transient failure (rate limit, timeout,
//! unavailability) is retried a small, bounded number of times with
//! exponentially increasing, capped delays; a permanent failure (bad
//! id, missing permission) fails fast on the first attempt.

use std::time::Duration;

use tracing::warn;

use crate::error::StoreError;

/// Exponent cap for the backoff shift; beyond this the delay cap
/// dominates anyway.
const MAX_BACKOFF_EXPONENT: u32 = 10;

/// Bounded-attempt exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 250,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based): `base << retry`,
    /// saturating, capped at `max_delay_ms`.
    #[must_use]
    pub fn delay_ms(&self, retry: u32) -> u64 {
        let shift = retry.min(MAX_BACKOFF_EXPONENT);
        let factor = 1_u64.checked_shl(shift).unwrap_or(u64::MAX);
        self.base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms)
    }

    /// Run `op`, retrying transient failures with backoff.
    ///
    /// Returns the first success, the first permanent failure, or,
    /// once attempts are exhausted, the last transient failure (still
    /// marked retryable, so the caller can surface "showing last known
    /// state" and try again later).
    pub fn run<T>(&self, mut op: impl FnMut() -> Result<T, StoreError>) -> Result<T, StoreError> {
        self.run_with_sleep(&mut op, |delay| std::thread::sleep(delay))
    }

    fn run_with_sleep<T>(
        &self,
        op: &mut impl FnMut() -> Result<T, StoreError>,
        mut sleep: impl FnMut(Duration),
    ) -> Result<T, StoreError> {
        let attempts = self.max_attempts.max(1);
        let mut retry = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retry + 1 < attempts => {
                    let delay = self.delay_ms(retry);
                    warn!(
                        attempt = retry + 1,
                        remaining = attempts - retry - 1,
                        delay_ms = delay,
                        code = %err.code(),
                        "transient store failure, backing off"
                    );
                    sleep(Duration::from_millis(delay));
                    retry += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
