//! Retry with exponential backoff around a commentary generator

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{CommentaryError, Result};
use crate::generator::CommentaryGenerator;

/// Backoff schedule for commentary calls; override fields on top of
/// `RetryPolicy::default()` to tune it
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first call included
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Growth factor between consecutive waits
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Wait before the given retry (1 = first retry)
    pub fn backoff_duration(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let millis = self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        if !millis.is_finite() || millis >= self.max_backoff.as_millis() as f64 {
            return self.max_backoff;
        }
        Duration::from_millis(millis as u64)
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error
    /// or runs out of attempts. The last error is returned.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            debug!(operation = operation_name, attempt, attempts, "calling");
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation = operation_name, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= attempts => {
                    warn!(operation = operation_name, attempts, error = %err, "giving up");
                    return Err(err);
                }
                Err(err) => {
                    let backoff = self.backoff_duration(attempt);
                    warn!(
                        operation = operation_name,
                        attempt,
                        attempts,
                        error = %err,
                        ?backoff,
                        "retrying"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Generator decorator that retries throttling and outages
pub struct RetryingGenerator<G> {
    inner: G,
    policy: RetryPolicy,
    label: String,
}

impl<G: CommentaryGenerator> RetryingGenerator<G> {
    pub fn new(inner: G, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            label: "generate".to_string(),
        }
    }

    /// Name used in retry logs
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<G: CommentaryGenerator> CommentaryGenerator for RetryingGenerator<G> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(CommentaryError::Other("empty prompt".to_string()));
        }
        self.policy
            .execute(&self.label, || self.inner.generate(prompt))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MockCommentaryGenerator;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick() -> RetryPolicy {
        RetryPolicy {
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(100),
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_backoff, Duration::from_millis(500));
        assert_eq!(policy.backoff_multiplier, 2.0);
    }

    #[test]
    fn test_backoff_growth_and_cap() {
        let policy = RetryPolicy {
            max_attempts: 6,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(2),
            backoff_multiplier: 3.0,
        };
        assert_eq!(policy.backoff_duration(0), Duration::ZERO);
        assert_eq!(policy.backoff_duration(1), Duration::from_millis(250));
        assert_eq!(policy.backoff_duration(2), Duration::from_millis(750));
        assert_eq!(policy.backoff_duration(3), Duration::from_secs(2));
        assert_eq!(policy.backoff_duration(40), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_rate_limit_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let mut mock = MockCommentaryGenerator::new();
        mock.expect_generate().times(2).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(CommentaryError::RateLimited("429".to_string()))
            } else {
                Ok("Bullish confluence".to_string())
            }
        });

        let generator = RetryingGenerator::new(mock, quick());
        let text = generator.generate("analyse BBCA").await.unwrap();
        assert_eq!(text, "Bullish confluence");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let mut mock = MockCommentaryGenerator::new();
        mock.expect_generate()
            .times(3)
            .returning(|_| Err(CommentaryError::ServiceUnavailable("503".to_string())));

        let generator = RetryingGenerator::new(mock, quick()).with_label("commentary");
        let err = generator.generate("analyse BBCA").await.unwrap_err();
        assert!(matches!(err, CommentaryError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let mut mock = MockCommentaryGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_| Err(CommentaryError::Other("invalid model".to_string())));

        let generator = RetryingGenerator::new(mock, quick());
        assert!(generator.generate("analyse BBCA").await.is_err());
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected_without_calling() {
        let mut mock = MockCommentaryGenerator::new();
        mock.expect_generate().times(0);

        let generator = RetryingGenerator::new(mock, quick());
        assert!(matches!(
            generator.generate("   ").await,
            Err(CommentaryError::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_single_attempt_policy_does_not_retry() {
        let mut mock = MockCommentaryGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_| Err(CommentaryError::RateLimited("429".to_string())));

        let policy = RetryPolicy {
            max_attempts: 1,
            ..quick()
        };
        let generator = RetryingGenerator::new(mock, policy);
        assert_eq!(generator.policy().max_attempts, 1);
        assert!(matches!(
            generator.generate("analyse BBCA").await,
            Err(CommentaryError::RateLimited(_))
        ));
    }
}
