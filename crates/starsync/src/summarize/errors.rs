use thiserror::Error;

/// HTTP statuses worth retrying: rate limits and transient server failures.
pub const RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

/// Errors raised by a summarizer.
///
/// A summarize error fails only the item it belongs to; the pass continues.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// The endpoint could not be reached.
    #[error("Request failed: {message}")]
    Request { message: String },

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// The summarizer is not configured (missing key, bad URL).
    #[error("Summarizer misconfigured: {message}")]
    Config { message: String },
}

impl SummarizeError {
    /// Create a request error.
    #[inline]
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Create an invalid response error.
    #[inline]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if the call may succeed when repeated.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Status { status, .. } if RETRYABLE_STATUS.contains(status))
    }
}
