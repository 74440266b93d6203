//! Bounded exponential-backoff retry for provider calls
//!
//! Wraps a single asynchronous operation with retry on transient
//! rate-limit rejections. Every attempt first waits for a slot from the
//! shared [`RateLimiter`], so retries never bypass the request spacing.

use crate::error::{MentoraError, Result};
use crate::gateway::classify::classify_provider_error;
use crate::gateway::rate_limit::RateLimiter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Executes fallible async operations with capped exponential backoff
///
/// Only rate-limit failures are retried; any other failure propagates
/// immediately after the first attempt. The backoff sequence for the
/// defaults is 2000, 4000, 8000, 16000, 32000ms, staying at the cap
/// afterwards, so max_retries of 5 means at most 6 attempts.
pub struct RetryPolicy {
    limiter: Arc<RateLimiter>,
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Create a retry policy sharing the given rate limiter
    pub fn new(
        limiter: Arc<RateLimiter>,
        max_retries: u32,
        initial_delay: Duration,
        max_delay: Duration,
    ) -> Self {
        Self {
            limiter,
            max_retries,
            initial_delay,
            max_delay,
        }
    }

    /// Maximum number of retries after the initial attempt
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Execute an operation, retrying rate-limited attempts with backoff
    ///
    /// # Errors
    ///
    /// Returns `MentoraError::RateLimitExceeded` once retries are
    /// exhausted on a rate-limited operation; any non-rate-limit failure
    /// is propagated untouched.
    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = self.initial_delay;
        let mut retries_left = self.max_retries;

        loop {
            self.limiter.acquire().await;

            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !classify_provider_error(&err.to_string()).is_transient() {
                        return Err(err);
                    }

                    if retries_left == 0 {
                        tracing::warn!("Rate limit retries exhausted: {}", err);
                        return Err(MentoraError::RateLimitExceeded(
                            "API rate limit reached. Please try again in a few moments."
                                .to_string(),
                        )
                        .into());
                    }

                    tracing::warn!(
                        "Rate limited, retrying in {}ms ({} retries left)",
                        delay.as_millis(),
                        retries_left
                    );
                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, self.max_delay);
                    retries_left -= 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn test_policy(max_retries: u32) -> RetryPolicy {
        // Interval of zero keeps the limiter out of the timing assertions
        RetryPolicy::new(
            Arc::new(RateLimiter::new(Duration::ZERO)),
            max_retries,
            Duration::from_millis(2_000),
            Duration::from_millis(32_000),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_returns_immediately() {
        let policy = test_policy(5);
        let attempts = AtomicU32::new(0);

        let result: Result<u32> = policy
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion_makes_n_plus_one_attempts() {
        let policy = test_policy(5);
        let attempts = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<u32> = policy
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(MentoraError::Provider("Gemini returned error 429: quota".to_string()).into())
            })
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 6);
        // Backoff sleeps: 2000 + 4000 + 8000 + 16000 + 32000
        assert_eq!(start.elapsed(), Duration::from_millis(62_000));

        let err = result.unwrap_err();
        let err = err.downcast_ref::<MentoraError>().unwrap();
        assert!(matches!(err, MentoraError::RateLimitExceeded(_)));
        assert!(err.to_string().contains("try again"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delay_is_capped() {
        let policy = RetryPolicy::new(
            Arc::new(RateLimiter::new(Duration::ZERO)),
            7,
            Duration::from_millis(2_000),
            Duration::from_millis(32_000),
        );
        let start = Instant::now();

        let result: Result<u32> = policy
            .execute(|| async {
                Err(MentoraError::Provider("429".to_string()).into())
            })
            .await;

        assert!(result.is_err());
        // 2000 + 4000 + 8000 + 16000 + 32000 + 32000 + 32000
        assert_eq!(start.elapsed(), Duration::from_millis(126_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_after_transient_rate_limits() {
        let policy = test_policy(5);
        let attempts = AtomicU32::new(0);

        let result: Result<&str> = policy
            .execute(|| async {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(MentoraError::Provider("error 429".to_string()).into())
                } else {
                    Ok("recovered")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_failure_propagates_without_retry() {
        let policy = test_policy(5);
        let attempts = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<u32> = policy
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(MentoraError::Provider("PERMISSION_DENIED".to_string()).into())
            })
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("PERMISSION_DENIED"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_fails_after_single_attempt() {
        let policy = test_policy(0);
        let attempts = AtomicU32::new(0);

        let result: Result<u32> = policy
            .execute(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(MentoraError::Provider("429".to_string()).into())
            })
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MentoraError>(),
            Some(MentoraError::RateLimitExceeded(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_attempt_waits_for_a_request_slot() {
        let policy = RetryPolicy::new(
            Arc::new(RateLimiter::new(Duration::from_millis(1_000))),
            1,
            Duration::from_millis(100),
            Duration::from_millis(400),
        );
        let start = Instant::now();

        let result: Result<u32> = policy
            .execute(|| async {
                Err(MentoraError::Provider("429".to_string()).into())
            })
            .await;

        assert!(result.is_err());
        // First slot is free, backoff sleeps 100ms, then the second attempt
        // still waits out the remaining 900ms of the request interval
        assert_eq!(start.elapsed(), Duration::from_millis(1_000));
    }
}
