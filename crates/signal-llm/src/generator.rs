//! Text generation capability

use async_trait::async_trait;

use crate::error::Result;

/// Turns a prompt into prose.
///
/// Implementations wrap a hosted or local model. They report throttling as
/// `RateLimited` and outages as `ServiceUnavailable` so callers can retry;
/// see [`crate::RetryingGenerator`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentaryGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
