//! GitHub star source.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - API response shapes and constants
//! - [`client`] - The [`GitHubClient`] implementing [`StarSource`](crate::platform::StarSource)
//! - [`convert`] - Conversion to [`SourceItem`](crate::item::SourceItem)
//!
//! ```ignore
//! use starsync::github::GitHubClient;
//! use starsync::platform::StarSource;
//!
//! let client = GitHubClient::new(&token)?;
//! let stars = client.fetch_snapshot(None).await?;
//! ```

mod client;
mod convert;
mod error;
mod types;

pub use client::{DEFAULT_API_BASE, GitHubClient, create_client, starred_route};
pub use convert::{decode_readme, to_source_item};
pub use error::{GitHubError, is_not_found_error, is_rate_limit_error};
pub use types::{
    GitHubRepo, PER_PAGE, README_MAX_CHARS, ReadmeResponse, STAR_MEDIA_TYPE, StarredEntry,
    TRUNCATION_MARKER,
};
