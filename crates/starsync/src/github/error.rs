//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::platform::FetchError;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("Authentication required")]
    AuthRequired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not a GitHub login: {0:?}")]
    InvalidUser(String),

    #[error("Unexpected HTTP status {status} for {route}")]
    Status { status: u16, route: String },

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub use crate::platform::short_error_message;

impl GitHubError {
    /// Check if the request may succeed when repeated after a pause.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(e) => is_rate_limit_error(e),
            Self::RateLimited { .. } => true,
            Self::Status { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }
}

/// Check if an octocrab error indicates a rate limit (403/429 or an empty body).
pub fn is_rate_limit_error(e: &octocrab::Error) -> bool {
    match e {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            status == 403 || status == 429
        }
        // Empty response body (EOF) often indicates rate limiting
        octocrab::Error::Json { .. } => true,
        _ => false,
    }
}

/// Check if an octocrab error is a 404.
pub fn is_not_found_error(e: &octocrab::Error) -> bool {
    matches!(e, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

impl From<GitHubError> for FetchError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::RateLimited { reset_at } => FetchError::RateLimited { reset_at },
            GitHubError::AuthRequired => FetchError::AuthRequired,
            GitHubError::NotFound(resource) => FetchError::not_found(resource),
            GitHubError::Api(e) => FetchError::api(short_error_message(&e)),
            GitHubError::Status { .. } | GitHubError::InvalidUser(_) => {
                FetchError::api(err.to_string())
            }
            GitHubError::Decode(msg) => FetchError::invalid_response(msg),
            GitHubError::Internal(msg) => FetchError::network(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        let rate_limited = GitHubError::RateLimited {
            reset_at: Utc::now(),
        };
        assert!(rate_limited.is_retryable());

        let gateway = GitHubError::Status {
            status: 502,
            route: "/user/starred".to_string(),
        };
        assert!(gateway.is_retryable());

        assert!(!GitHubError::AuthRequired.is_retryable());
        assert!(!GitHubError::NotFound("ghost".to_string()).is_retryable());
    }

    #[test]
    fn test_into_fetch_error() {
        let err: FetchError = GitHubError::NotFound("user: ghost".to_string()).into();
        assert!(err.is_not_found());

        let err: FetchError = GitHubError::AuthRequired.into();
        assert!(matches!(err, FetchError::AuthRequired));

        let err: FetchError = GitHubError::Internal("connection reset".to_string()).into();
        assert!(matches!(err, FetchError::Network { .. }));
    }
}
