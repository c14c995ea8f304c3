use async_trait::async_trait;

use super::errors::SummarizeError;

/// Input for one summarizer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    /// Identity of the repository being summarized (for logging).
    pub identity: String,
    /// Text to summarize.
    pub text: String,
    /// Language the summary should be written in.
    pub target_language: String,
}

/// Turns repository text into a short summary.
///
/// An `Ok` with an empty (or whitespace-only) string is a legitimate
/// "nothing to say" answer and is treated differently from an error.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize the request text.
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizeError>;
}
