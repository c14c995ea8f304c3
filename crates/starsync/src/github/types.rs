//! GitHub API response shapes.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Media type that makes `/starred` return `{ starred_at, repo }` entries.
pub const STAR_MEDIA_TYPE: &str = "application/vnd.github.star+json";

/// API version header value.
pub const API_VERSION: &str = "2022-11-28";

/// Items requested per starred page (the API maximum).
pub const PER_PAGE: usize = 100;

/// Maximum README characters kept before truncation.
pub const README_MAX_CHARS: usize = 30_000;

/// Marker appended to a truncated README.
pub const TRUNCATION_MARKER: &str = "\n…(truncated)";

/// One entry of a starred listing in the star+json media type.
#[derive(Debug, Clone, Deserialize)]
pub struct StarredEntry {
    /// When the user starred the repository.
    pub starred_at: Option<DateTime<Utc>>,
    /// The repository.
    pub repo: GitHubRepo,
}

/// The subset of GitHub's repository object starsync tracks.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub full_name: String,
    pub name: String,
    pub owner: GitHubOwner,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub stargazers_count: u32,
}

/// Repository owner.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

/// Response of `GET /repos/{owner}/{repo}/readme`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadmeResponse {
    /// Base64 content, wrapped at 60 columns.
    pub content: String,
    /// Content encoding (always `base64` in practice).
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Response of `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
}
