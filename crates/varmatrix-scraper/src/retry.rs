//! Bounded retry with exponential backoff for base-page loads.
//!
//! Only transient render failures (see [`RenderError::is_transient`]) are
//! retried. Per-variant navigations never go through here: a failed variant
//! is skipped, not retried.
//!
//! The caller owns the loop so the renderer can stay mutably borrowed
//! across attempts:
//!
//! ```ignore
//! let mut backoff = Backoff::new(max_retries, backoff_base_ms);
//! loop {
//!     match renderer.navigate(url, mode, timeout).await {
//!         Ok(()) => break,
//!         Err(err) if backoff.should_retry(&err).await => continue,
//!         Err(err) => return Err(err),
//!     }
//! }
//! ```

use std::time::Duration;

use crate::error::RenderError;

/// Ceiling for a single backoff sleep.
const MAX_DELAY_MS: u64 = 60_000;

/// Retry bookkeeping for one operation.
///
/// # Backoff schedule (example with `base_ms = 2000`)
///
/// | Attempt | Sleep before next attempt |
/// |---------|--------------------------|
/// | 0 (initial) | none |
/// | 1 (first retry) | 2000 × 2^0 = 2 s |
/// | 2 (second retry) | 2000 × 2^1 = 4 s |
///
/// With `max_retries = 2` the operation is attempted at most 3 times total.
/// A single sleep never exceeds [`MAX_DELAY_MS`].
#[derive(Debug)]
pub(crate) struct Backoff {
    max_retries: u32,
    base_ms: u64,
    retries_used: u32,
}

impl Backoff {
    pub(crate) fn new(max_retries: u32, base_ms: u64) -> Self {
        Self {
            max_retries,
            base_ms,
            retries_used: 0,
        }
    }

    /// Attempts made so far, assuming the caller just observed a failure.
    pub(crate) fn attempts(&self) -> u32 {
        self.retries_used + 1
    }

    /// Delay before the next retry: `base_ms * 2^retries_used`, capped at
    /// [`MAX_DELAY_MS`].
    fn next_delay(&self) -> Duration {
        let exponential = self
            .base_ms
            .saturating_mul(1u64 << self.retries_used.min(62));
        Duration::from_millis(exponential.min(MAX_DELAY_MS))
    }

    /// Decides whether `err` should be retried and, if so, sleeps the backoff.
    ///
    /// Returns `false` for non-transient errors and once retries are exhausted.
    pub(crate) async fn should_retry(&mut self, err: &RenderError) -> bool {
        if !err.is_transient() || self.retries_used >= self.max_retries {
            return false;
        }
        let delay = self.next_delay();
        tracing::warn!(
            attempt = self.retries_used,
            max_retries = self.max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient navigation error; retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        self.retries_used += 1;
        true
    }
}
