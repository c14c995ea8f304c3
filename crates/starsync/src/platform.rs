//! Star source abstraction.
//!
//! This module defines the [`StarSource`] trait the sync engine uses to obtain
//! the user's current starred repositories and their README text.
//!
//! # Example
//!
//! ```ignore
//! use starsync::platform::StarSource;
//!
//! async fn show<S: StarSource>(source: &S) -> Result<(), FetchError> {
//!     for item in source.fetch_snapshot(None).await? {
//!         println!("{} ★{}", item.full_name, item.descriptor.stars);
//!     }
//!     Ok(())
//! }
//! ```

mod errors;
#[cfg(feature = "github")]
mod rate_limit;
mod types;

pub use errors::{FetchError, Result, short_error_message};
#[cfg(feature = "github")]
pub use rate_limit::{ApiRateLimiter, rate_limits};
pub use types::StarSource;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_api() {
        let err = FetchError::api("Something went wrong");
        assert!(err.to_string().contains("API error"));
        assert!(err.to_string().contains("Something went wrong"));
    }

    #[test]
    fn test_fetch_error_not_found() {
        let err = FetchError::not_found("octocat/missing");
        assert!(err.to_string().contains("Not found"));
        assert!(err.is_not_found());
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_fetch_error_rate_limited() {
        let err = FetchError::RateLimited {
            reset_at: chrono::Utc::now(),
        };
        assert!(err.to_string().contains("Rate limit"));
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_fetch_error_network() {
        let err = FetchError::network("connection refused");
        assert!(err.to_string().contains("Network error"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_short_error_message_multiline() {
        let err = std::io::Error::other("first line\nsecond line\nthird line");
        assert_eq!(short_error_message(&err), "first line");
    }

    #[cfg(feature = "github")]
    #[tokio::test]
    async fn test_api_rate_limiter_allows_first_request() {
        let limiter = ApiRateLimiter::new(100);
        let start = std::time::Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < std::time::Duration::from_millis(50));

        // Zero is clamped rather than panicking
        let zero = ApiRateLimiter::new(0);
        zero.wait().await;
    }
}
