//! Retry with exponential backoff for transient network failures.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Errors that can tell whether retrying may succeed.
pub trait Transient {
    /// Whether the failure is transient (network, rate limit, 5xx).
    fn is_transient(&self) -> bool;
}

/// Backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` disables retrying.
    pub max_retries: usize,
    /// Delay before the first retry; doubled on each further retry.
    pub initial_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Policy that never retries.
    pub const NONE: Self = Self {
        max_retries: 0,
        initial_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    };

    /// Policy with `max_retries` retries and the default delays.
    #[must_use]
    pub const fn with_retries(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..DEFAULT_POLICY
        }
    }

    fn delay(&self, attempt: usize) -> Duration {
        let factor = 1_u32 << attempt.min(10);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

const DEFAULT_POLICY: RetryPolicy = RetryPolicy {
    max_retries: 2,
    initial_delay: Duration::from_millis(200),
    max_delay: Duration::from_secs(5),
};

impl Default for RetryPolicy {
    fn default() -> Self {
        DEFAULT_POLICY
    }
}

/// Runs `f` until it succeeds, fails permanently, or exhausts `policy`.
///
/// # Errors
///
/// Returns the last error produced by `f`.
pub async fn with_retry<F, Fut, T, E>(operation: &str, policy: RetryPolicy, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => {
                debug!(%operation, error = %err, "non-transient error, not retrying");
                return Err(err);
            }
            Err(err) if attempt >= policy.max_retries => {
                warn!(%operation, attempts = attempt + 1, error = %err, "retries exhausted");
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay(attempt);
                warn!(
                    %operation,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = %delay.as_millis(),
                    error = %err,
                    "transient error, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct TestError(&'static str, bool);

    impl Transient for TestError {
        fn is_transient(&self) -> bool {
            self.1
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let calls = &AtomicUsize::new(0);
        let result = with_retry("test", RetryPolicy::with_retries(3), move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(TestError("flaky", true))
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_on_permanent_errors_and_exhaustion() {
        let calls = &AtomicUsize::new(0);
        let result: Result<(), _> = with_retry("test", RetryPolicy::with_retries(3), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError("bad request", false))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        calls.store(0, Ordering::SeqCst);
        let result: Result<(), _> = with_retry("test", RetryPolicy::with_retries(2), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError("down", true))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn delay_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_millis(200));
        assert_eq!(policy.delay(1), Duration::from_millis(400));
        assert_eq!(policy.delay(9), Duration::from_secs(5));
    }
}
