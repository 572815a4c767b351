//! Retry with exponential backoff
//!
//! One reusable combinator for every retried call in the engine,
//! parameterized by attempt limit, backoff schedule, and a
//! retryable-error predicate. Rate-limited failures sleep an extra fixed
//! delay on top of the backoff.

use std::time::Duration;

/// How a failed attempt should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retryable {
    /// Permanent failure: return immediately
    No,
    /// Transient failure: exponential backoff, then retry
    Transient,
    /// The remote asked us to slow down: backoff plus a fixed extra delay
    RateLimited,
}

/// Backoff schedule for one call site
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry
    pub base_delay: Duration,
    /// Backoff ceiling
    pub max_delay: Duration,
    /// Extra fixed delay after a rate-limited response
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(8),
            rate_limit_delay: Duration::from_millis(2000),
        }
    }
}

/// Run `operation` until it succeeds, a permanent error occurs, or the
/// attempt limit is exhausted. Returns the final error in the last case.
pub async fn retry_with_backoff<F, Fut, T, E>(
    operation_name: &str,
    policy: &RetryPolicy,
    is_retryable: impl Fn(&E) -> Retryable,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut backoff = policy.base_delay;

    for attempt in 1..=policy.max_attempts {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                let retryable = is_retryable(&err);

                if retryable == Retryable::No || attempt == policy.max_attempts {
                    if attempt == policy.max_attempts && retryable != Retryable::No {
                        tracing::warn!(
                            operation = operation_name,
                            attempts = policy.max_attempts,
                            error = %err,
                            "Retries exhausted"
                        );
                    }
                    return Err(err);
                }

                let mut delay = backoff;
                if retryable == Retryable::RateLimited {
                    delay += policy.rate_limit_delay;
                }

                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient failure, will retry after backoff"
                );

                tokio::time::sleep(delay).await;
                backoff = (backoff * 2).min(policy.max_delay);
            }
        }
    }

    unreachable!("loop returns on the final attempt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            rate_limit_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn succeeds_first_attempt() {
        let result: Result<i32, String> =
            retry_with_backoff("test_op", &fast_policy(), |_| Retryable::Transient, || async {
                Ok(42)
            })
            .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let attempts = AtomicU32::new(0);
        let result: Result<i32, String> =
            retry_with_backoff("test_op", &fast_policy(), |_| Retryable::Transient, || {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err("transient".to_string())
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_fail_immediately() {
        let attempts = AtomicU32::new(0);
        let result: Result<i32, String> =
            retry_with_backoff("test_op", &fast_policy(), |_| Retryable::No, || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err("permanent".to_string()) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_returns_the_final_error() {
        let attempts = AtomicU32::new(0);
        let result: Result<i32, String> =
            retry_with_backoff("test_op", &fast_policy(), |_| Retryable::RateLimited, || {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Err(format!("failure {}", n)) }
            })
            .await;

        assert_eq!(result.unwrap_err(), "failure 3");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
