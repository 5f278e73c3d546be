//! Error types for commentary generation and prompt rendering

use thiserror::Error;

/// Result type for commentary operations
pub type Result<T> = std::result::Result<T, CommentaryError>;

/// Errors reported by a commentary generator
#[derive(Error, Debug)]
pub enum CommentaryError {
    /// Provider asked us to slow down
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Provider temporarily unreachable or overloaded
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Prompt could not be built
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// Anything else; never retried
    #[error("Commentary failed: {0}")]
    Other(String),
}

impl CommentaryError {
    /// Whether trying again later can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CommentaryError::RateLimited(_) | CommentaryError::ServiceUnavailable(_)
        )
    }
}

/// Errors from prompt templates
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Template '{name}' has no {language} variant")]
    TemplateNotFound { name: String, language: String },

    #[error("Template '{name}' ({language}) failed to parse: {detail}")]
    TemplateParseFailed {
        name: String,
        language: String,
        detail: String,
    },

    #[error("Template '{name}' failed to render: {detail}")]
    RenderError { name: String, detail: String },

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}
