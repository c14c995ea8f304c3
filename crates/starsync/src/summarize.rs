//! Summarization of repository text.
//!
//! The engine depends only on the [`Summarizer`] trait. [`compose_text`]
//! builds the text it is given; [`OpenAiSummarizer`] is the production
//! implementation (feature `openai`).

mod errors;
#[cfg(feature = "openai")]
mod openai;
mod prompt;
mod types;

pub use errors::{RETRYABLE_STATUS, SummarizeError};
#[cfg(feature = "openai")]
pub use openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiConfig, OpenAiSummarizer, system_prompt};
pub use prompt::{README_EXCERPT_CHARS, compose_text, excerpt};
pub use types::{SummaryRequest, Summarizer};
