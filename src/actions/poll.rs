//! Poll-and-sleep primitive.
//!
//! Every wait in the crate goes through [`Poller`] or [`pause`]. Both sleep
//! on `tokio::time`, so tests run them on the paused virtual clock.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::trace;

use crate::error::Result;

/// Smallest gap between probes.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

// ============================================================================
// Poller
// ============================================================================

/// Repeats a probe until it yields a value or the timeout elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    timeout: Duration,
    interval: Duration,
}

impl Poller {
    /// Creates a poller. A zero `interval` is raised to one millisecond.
    #[inline]
    #[must_use]
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Returns the timeout.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the gap between probes.
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs `probe` until it returns `Ok(Some(_))`.
    ///
    /// The probe always runs at least once, and once more at the deadline.
    /// Recoverable errors (see [`Error::is_recoverable`]) count as "not
    /// yet"; any other error ends the wait immediately.
    ///
    /// Returns `Ok(None)` when the timeout elapses.
    ///
    /// [`Error::is_recoverable`]: crate::Error::is_recoverable
    ///
    /// # Errors
    ///
    /// Returns the first non-recoverable probe error.
    pub async fn until<T, F, Fut>(&self, mut probe: F) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match probe().await {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => {}
                Err(e) if e.is_recoverable() => {
                    trace!(attempt = attempts, error = %e, "Probe failed, retrying");
                }
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                trace!(attempts, "Poll timed out");
                return Ok(None);
            }
            sleep(self.interval.min(deadline - now)).await;
        }
    }
}

// ============================================================================
// pause
// ============================================================================

/// Sleeps for `delay`, returning at once when it is zero.
pub async fn pause(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
