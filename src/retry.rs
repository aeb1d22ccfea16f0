use std::fmt::Display;
use std::future::Future;

use tokio::time::{Duration, sleep};
use tracing::warn;

use crate::error::{LogoError, UpstreamErrorKind};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
const DEFAULT_MAX_JITTER_MS: u64 = 1_000;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn retry_class(&self) -> UpstreamErrorKind;
}

impl Retryable for LogoError {
    fn retry_class(&self) -> UpstreamErrorKind {
        match self {
            LogoError::Upstream(err) => err.kind,
            LogoError::Http(err) => {
                if err.is_timeout() || err.is_connect() {
                    UpstreamErrorKind::Transient
                } else if let Some(status) = err.status() {
                    UpstreamErrorKind::from_status(status.as_u16())
                } else {
                    UpstreamErrorKind::from_message(&err.to_string())
                }
            }
            _ => UpstreamErrorKind::Fatal,
        }
    }
}

/// Exponential backoff with jitter for rate-limited and transient failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            max_jitter: Duration::from_millis(DEFAULT_MAX_JITTER_MS),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay before the retry that follows the 1-indexed `attempt`.
    pub fn backoff_delay(&self, attempt: u32, jitter: Duration) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let exponential = self.base_delay.saturating_mul(1u32 << exponent);
        exponential.saturating_add(jitter).min(self.max_delay)
    }

    fn draw_jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(fastrand::u64(0..max_ms))
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or `max_attempts` tries have been used. The last error is returned as-is.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let class = err.retry_class();
                    if !class.is_retryable() || attempt >= max_attempts {
                        return Err(err);
                    }
                    let delay = self.backoff_delay(attempt, self.draw_jitter());
                    warn!(
                        "attempt {}/{} failed ({}): {}. Retrying in {:?}",
                        attempt, max_attempts, class, err, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;
    use crate::error::UpstreamError;

    fn rate_limited() -> LogoError {
        LogoError::Upstream(UpstreamError::new(
            UpstreamErrorKind::RateLimited,
            "Rate limit reached for images",
        ))
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(1, Duration::ZERO), Duration::from_millis(1_000));
        assert_eq!(policy.backoff_delay(2, Duration::ZERO), Duration::from_millis(2_000));
        assert_eq!(
            policy.backoff_delay(3, Duration::from_millis(500)),
            Duration::from_millis(4_500)
        );
        assert_eq!(
            policy.backoff_delay(10, Duration::from_millis(999)),
            Duration::from_millis(30_000)
        );
    }

    #[test]
    fn jitter_stays_below_one_second() {
        let policy = RetryPolicy::default();
        for _ in 0..200 {
            assert!(policy.draw_jitter() < Duration::from_millis(1_000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_rate_limit_until_success() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();
        let result = RetryPolicy::default()
            .execute(|| {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call < 3 {
                        Err(rate_limited())
                    } else {
                        Ok("logo")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "logo");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_millis(3_000));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_fails_after_one_call() {
        let calls = AtomicU32::new(0);
        let result: Result<(), LogoError> = RetryPolicy::default()
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(LogoError::validation("bad prompt")) }
            })
            .await;

        assert!(matches!(result, Err(LogoError::Validation { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_surface_original_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), LogoError> = RetryPolicy::default()
            .with_max_attempts(2)
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(LogoError::Upstream(UpstreamError::from_untyped(
                        "socket hang up",
                    )))
                }
            })
            .await;

        match result {
            Err(LogoError::Upstream(err)) => {
                assert_eq!(err.kind, UpstreamErrorKind::Transient);
                assert_eq!(err.message, "socket hang up");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
