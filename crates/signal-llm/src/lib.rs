//! Commentary generation for signal analysis results
//!
//! The engine produces structured numbers; this crate turns them into
//! prose through an external text generator:
//!
//! - [`CommentaryGenerator`]: the `generate(prompt)` capability a model client implements
//! - [`RetryPolicy`] and [`RetryingGenerator`]: exponential backoff on throttling and outages
//! - [`CommentaryPrompt`]: English and Indonesian MiniJinja templates for
//!   confluence results and screening rankings
//!
//! # Example
//!
//! ```rust,ignore
//! use signal_llm::{CommentaryPrompt, Language, RetryPolicy, RetryingGenerator};
//!
//! let generator = RetryingGenerator::new(client, RetryPolicy::default());
//! let prompt = CommentaryPrompt::new()?.confluence(&result, Language::English)?;
//! let commentary = generator.generate(&prompt).await?;
//! ```

pub mod error;
pub mod generator;
pub mod language;
pub mod prompt;
pub mod retry;

pub use error::{CommentaryError, PromptError, Result};
pub use generator::CommentaryGenerator;
pub use language::Language;
pub use prompt::{CommentaryPrompt, CommentaryTemplate};
pub use retry::{RetryPolicy, RetryingGenerator};
