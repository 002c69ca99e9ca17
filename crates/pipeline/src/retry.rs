//! Fixed-delay retry for image generation.
//!
//! Every failure is retried the same way: no backoff, no jitter and no
//! classification of the error. After the last attempt the error is
//! returned to the caller.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 2;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_delay(DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    /// One attempt plus [`DEFAULT_RETRIES`] retries, `delay` apart.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            max_attempts: DEFAULT_RETRIES + 1,
            delay,
        }
    }

    /// Run `operation` until it succeeds or the attempts are used up.
    ///
    /// `operation` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(label, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(
                        label,
                        error = %e,
                        delay_ms = self.delay.as_millis() as u64,
                        "Attempt {attempt} of {max_attempts} failed, retrying",
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(label, error = %e, "Giving up after {attempt} attempts");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn instant() -> RetryPolicy {
        RetryPolicy::with_delay(Duration::ZERO)
    }

    #[test]
    fn default_is_three_attempts() {
        assert_eq!(RetryPolicy::default().max_attempts, 3);
    }

    #[tokio::test]
    async fn first_success_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = instant()
            .run("test", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(attempt) }
            })
            .await;
        assert_eq!(result, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_on_last_attempt() {
        let result: Result<u32, String> = instant()
            .run("test", |attempt| async move {
                if attempt < 3 {
                    Err(format!("failure {attempt}"))
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn surfaces_last_error_after_two_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = instant()
            .run("test", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("failure {attempt}")) }
            })
            .await;
        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
