//! Bounded retry with a fixed delay.
//!
//! Used for broker connection establishment: each failed attempt is
//! logged with its count, the caller sleeps `delay`, and after
//! `max_attempts` failures the last error is surfaced. The dispatcher's
//! send-retry wrapper is separate (it lives with the dispatcher, where
//! the retriable/permanent distinction is made).

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How many times to try an operation, and how long to wait in between.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of attempts (not additional retries). Clamped to at
    /// least one attempt.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// The closure receives the 1-based attempt number. Returns the value of
/// the first successful attempt, or the error of the final attempt.
pub async fn with_retries<T, E, F, Fut>(
    policy: RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);

    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < max_attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    error = %error,
                    "{what} not ready yet, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(error) => {
                tracing::error!(
                    attempts = max_attempts,
                    error = %error,
                    "{what} failed, giving up"
                );
                return Err(error);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn returns_first_success_without_further_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retries(
            RetryPolicy {
                max_attempts: 5,
                delay: Duration::from_secs(1),
            },
            "test op",
            |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt >= 3 {
                        Ok(attempt)
                    } else {
                        Err("not yet".to_string())
                    }
                }
            },
        )
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_exactly_max_attempts_then_surfaces_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = with_retries(
            RetryPolicy {
                max_attempts: 2,
                delay: Duration::from_secs(5),
            },
            "unreachable broker",
            |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("connection refused (attempt {attempt})")) }
            },
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.unwrap_err(), "connection refused (attempt 2)");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_is_clamped_to_one() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = with_retries(
            RetryPolicy {
                max_attempts: 0,
                delay: Duration::from_millis(1),
            },
            "clamped op",
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("nope") }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
