//! Bounded retry with backoff, kept separate from the I/O it wraps.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

use crate::error::Error;

/// Default number of attempts, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upper bound of the random jitter added to non-zero delays.
const MAX_JITTER_MS: u64 = 250;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::RateLimited(_) | Error::ServerError(_) => true,
            Error::Http(e) => !e.is_status() && !e.is_builder(),
            _ => false,
        }
    }
}

/// Delay schedule between attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    Fixed(Duration),
    Exponential {
        base: Duration,
        max: Duration,
        multiplier: f64,
    },
}

/// How many times to attempt and how long to wait in between.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::Exponential {
                base: Duration::from_secs(1),
                max: Duration::from_secs(30),
                multiplier: 2.0,
            },
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            jitter: true,
        }
    }

    /// Keep the default backoff with a different attempt count.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Retry immediately, without any delay. Used by tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Backoff::Fixed(Duration::ZERO),
            jitter: false,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the attempt following `attempt` (1-indexed), without jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match &self.backoff {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential {
                base,
                max,
                multiplier,
            } => {
                let exponent = attempt.saturating_sub(1).min(16) as i32;
                let scaled = base.as_secs_f64() * multiplier.powi(exponent);
                Duration::from_secs_f64(scaled.min(max.as_secs_f64()))
            }
        }
    }

    fn jittered_delay(&self, attempt: u32) -> Duration {
        let delay = self.delay_for(attempt);
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..=MAX_JITTER_MS);
        delay + Duration::from_millis(jitter_ms)
    }
}

/// Why `with_retry` gave up.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every allowed attempt failed with a retryable error.
    Exhausted { attempts: u32, last: E },
    /// A non-retryable error ended the loop early.
    Aborted { attempts: u32, error: E },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } | RetryError::Aborted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Aborted { error, .. } => error,
        }
    }
}

/// Run `attempt_fn` until it succeeds, fails with a non-retryable error, or
/// `policy.max_attempts()` attempts have been made. The closure receives the
/// 1-indexed attempt number.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut attempt_fn: F,
) -> std::result::Result<T, RetryError<E>>
where
    E: Retryable + std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match attempt_fn(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if !error.is_retryable() => {
                return Err(RetryError::Aborted {
                    attempts: attempt,
                    error,
                });
            }
            Err(error) if attempt >= policy.max_attempts() => {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: error,
                });
            }
            Err(error) => {
                let delay = policy.jittered_delay(attempt);
                tracing::debug!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt,
                    policy.max_attempts(),
                    error,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct TestError {
        retryable: bool,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "test error (retryable: {})", self.retryable)
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            self.retryable
        }
    }

    #[tokio::test]
    async fn test_always_failing_is_bounded() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::immediate(4);

        let result: std::result::Result<(), _> = with_retry(&policy, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError { retryable: true }) }
        })
        .await;

        match result {
            Err(RetryError::Exhausted { attempts, .. }) => assert_eq!(attempts, 4),
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_success_stops_retrying() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::immediate(5);

        let result = with_retry(&policy, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(TestError { retryable: true })
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_aborts_immediately() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::immediate(5);

        let result: std::result::Result<(), _> = with_retry(&policy, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError { retryable: false }) }
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::Aborted { attempts: 1, .. }));
        assert!(!err.into_inner().retryable);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_exponential_delays_are_capped() {
        let policy = RetryPolicy::new(
            10,
            Backoff::Exponential {
                base: Duration::from_secs(1),
                max: Duration::from_secs(5),
                multiplier: 2.0,
            },
        );
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(4), Duration::from_secs(5));
        assert_eq!(policy.delay_for(40), Duration::from_secs(5));
    }

    #[test]
    fn test_fixed_delay_and_minimum_attempts() {
        let policy = RetryPolicy::new(0, Backoff::Fixed(Duration::from_millis(300)));
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.delay_for(1), Duration::from_millis(300));
        assert_eq!(policy.delay_for(7), Duration::from_millis(300));
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::RateLimited(60).is_retryable());
        assert!(Error::ServerError(502).is_retryable());
        assert!(!Error::Api("bad request".into()).is_retryable());
        assert!(!Error::ClientClosed.is_retryable());
    }
}
