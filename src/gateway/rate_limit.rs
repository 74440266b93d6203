//! Minimum-interval spacing for outbound provider requests
//!
//! A single `RateLimiter` instance is shared by everything that talks to a
//! given provider endpoint, so bursts of user actions are spread out instead
//! of tripping the provider's request-per-second limits.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum spacing between consecutive outbound requests
///
/// The last-granted timestamp is recorded at the moment the slot is granted,
/// not when `acquire` is called, so concurrent callers cannot compress the
/// interval. Waiters serialize on the internal mutex; no fairness beyond
/// that is guaranteed.
pub struct RateLimiter {
    min_interval: Duration,
    last_granted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the given minimum spacing between requests
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_granted: Mutex::new(None),
        }
    }

    /// The configured minimum spacing
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a request slot is available, then claim it
    ///
    /// If less than `min_interval` has elapsed since the previous grant, the
    /// caller sleeps for the remaining delta. The mutex is held across the
    /// sleep so the grant timestamp and the sleep are one atomic step.
    pub async fn acquire(&self) {
        let mut last = self.last_granted.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                tracing::debug!("Rate limiter waiting {}ms for next slot", remaining.as_millis());
                tokio::time::sleep(remaining).await;
            }
        }
        *last = Some(Instant::now());
    }
}
