//! GitHub API client implementing [`StarSource`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap};

use super::convert::{decode_readme, to_source_item};
use super::error::{GitHubError, is_not_found_error, short_error_message};
use super::types::{
    API_VERSION, AuthenticatedUser, PER_PAGE, ReadmeResponse, STAR_MEDIA_TYPE, StarredEntry,
};
use crate::item::SourceItem;
use crate::platform::{self, ApiRateLimiter, FetchError, StarSource, rate_limits};
use crate::retry::{RetryConfig, with_retry_config};
use crate::sync::{ProgressCallback, SyncProgress, emit};

/// Default GitHub REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Create an authenticated Octocrab instance from a GitHub token.
pub fn create_client(token: &str, api_base: &str) -> Result<Octocrab, GitHubError> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .base_uri(api_base)
        .map_err(GitHubError::Api)?
        .build()
        .map_err(GitHubError::Api)
}

/// GitHub logins are 1 to 39 ASCII letters, digits or hyphens.
fn check_login(user: &str) -> Result<&str, GitHubError> {
    let valid = (1..=39).contains(&user.len())
        && user.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-');
    if valid {
        Ok(user)
    } else {
        Err(GitHubError::InvalidUser(user.to_string()))
    }
}

/// Route for one page of starred repositories.
///
/// # Errors
/// Returns `GitHubError::InvalidUser` for a name that is not a GitHub login,
/// so it can never reshape the path or query.
pub fn starred_route(user: Option<&str>, page: u32) -> Result<String, GitHubError> {
    Ok(match user {
        Some(user) => format!(
            "/users/{}/starred?per_page={}&page={}",
            check_login(user)?,
            PER_PAGE,
            page
        ),
        None => format!("/user/starred?per_page={}&page={}", PER_PAGE, page),
    })
}

/// Read the rate limit reset time from response headers.
fn rate_limit_reset(headers: &HeaderMap) -> DateTime<Utc> {
    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
        .unwrap_or_else(Utc::now)
}

fn rate_limit_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "0")
}

/// GitHub client for starred repositories and README retrieval.
///
/// Wraps an `Octocrab` instance for regular JSON endpoints and a plain
/// `reqwest` client for the starred listing, which needs a custom media type.
/// All requests are paced by a shared rate limiter.
#[derive(Clone)]
pub struct GitHubClient {
    inner: Arc<Octocrab>,
    token: Arc<String>,
    http_client: reqwest::Client,
    api_base: Arc<String>,
    rate_limiter: ApiRateLimiter,
    retry: RetryConfig,
}

impl GitHubClient {
    /// Create a new GitHub client from an authentication token.
    pub fn new(token: &str) -> Result<Self, GitHubError> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a client against a different API base (GitHub Enterprise, tests).
    pub fn with_api_base(token: &str, api_base: &str) -> Result<Self, GitHubError> {
        let api_base = api_base.trim_end_matches('/');
        let client = create_client(token, api_base)?;
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("starsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GitHubError::Internal(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(client),
            token: Arc::new(token.to_string()),
            http_client,
            api_base: Arc::new(api_base.to_string()),
            rate_limiter: ApiRateLimiter::new(rate_limits::GITHUB_DEFAULT_RPS),
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Get a reference to the inner Octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.inner
    }

    /// Resolve the login of the token owner.
    pub async fn get_username(&self) -> Result<String, GitHubError> {
        self.rate_limiter.wait().await;
        let user: AuthenticatedUser = self.inner.get("/user", None::<&()>).await?;
        Ok(user.login)
    }

    /// Fetch one page of starred repositories.
    async fn get_starred_page(
        &self,
        user: Option<&str>,
        page: u32,
    ) -> Result<Vec<StarredEntry>, GitHubError> {
        self.rate_limiter.wait().await;

        let route = starred_route(user, page)?;
        let response = self
            .http_client
            .get(format!("{}{}", self.api_base, route))
            .header(ACCEPT, STAR_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(self.token.as_str())
            .send()
            .await
            .map_err(|e| GitHubError::Internal(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let headers = response.headers().clone();

        match status {
            StatusCode::OK => response
                .json()
                .await
                .map_err(|e| GitHubError::Decode(format!("JSON parse error: {}", e))),
            StatusCode::TOO_MANY_REQUESTS => Err(GitHubError::RateLimited {
                reset_at: rate_limit_reset(&headers),
            }),
            StatusCode::FORBIDDEN if rate_limit_exhausted(&headers) => {
                Err(GitHubError::RateLimited {
                    reset_at: rate_limit_reset(&headers),
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GitHubError::AuthRequired),
            StatusCode::NOT_FOUND => Err(GitHubError::NotFound(format!(
                "user: {}",
                user.unwrap_or("(authenticated)")
            ))),
            _ => Err(GitHubError::Status {
                status: status.as_u16(),
                route,
            }),
        }
    }

    /// List every starred repository, reporting each page.
    ///
    /// Pages are fetched in order until a short or empty page. Rate limited
    /// pages are retried; any other failure aborts the listing.
    pub async fn list_starred(
        &self,
        user: Option<&str>,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<SourceItem>, GitHubError> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let target = format!("starred page {}", page);
            let entries = with_retry_config(
                self.retry.clone(),
                || self.get_starred_page(user, page),
                GitHubError::is_retryable,
                short_error_message,
                &target,
                on_progress,
            )
            .await?;

            let count = entries.len();
            items.extend(entries.into_iter().map(to_source_item));

            tracing::info!(page, count, total = items.len(), "Fetched starred page");
            emit(
                on_progress,
                SyncProgress::FetchedPage {
                    page,
                    count,
                    total_so_far: items.len(),
                },
            );

            if count < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// Fetch and decode a repository's README.
    ///
    /// Returns `Ok(None)` when the repository has no README.
    pub async fn get_readme(&self, item: &SourceItem) -> Result<Option<String>, GitHubError> {
        let route = item
            .readme_path
            .clone()
            .unwrap_or_else(|| format!("/repos/{}/readme", item.full_name));

        let result = with_retry_config(
            self.retry.clone(),
            || async {
                self.rate_limiter.wait().await;
                self.inner
                    .get::<ReadmeResponse, _, _>(&route, None::<&()>)
                    .await
                    .map_err(GitHubError::Api)
            },
            GitHubError::is_retryable,
            short_error_message,
            &item.full_name,
            None,
        )
        .await;

        match result {
            Ok(readme) => decode_readme(&readme).map(Some),
            Err(GitHubError::Api(e)) if is_not_found_error(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StarSource for GitHubClient {
    async fn fetch_snapshot(&self, user: Option<&str>) -> platform::Result<Vec<SourceItem>> {
        self.list_starred(user, None)
            .await
            .map_err(FetchError::from)
    }

    async fn fetch_readme(&self, item: &SourceItem) -> platform::Result<Option<String>> {
        self.get_readme(item).await.map_err(FetchError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::{Canned, serve};

    fn fast_retry() -> RetryConfig {
        RetryConfig::new(Duration::from_millis(1), Duration::from_millis(5), 2).with_jitter(false)
    }

    fn starred_json(count: usize, offset: usize) -> String {
        let entries: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                let name = format!("repo{}", offset + i);
                serde_json::json!({
                    "starred_at": "2024-01-01T00:00:00Z",
                    "repo": {
                        "full_name": format!("octocat/{}", name),
                        "name": name,
                        "owner": { "login": "octocat" },
                        "html_url": format!("https://github.com/octocat/{}", name),
                        "description": "test",
                        "language": "Rust",
                        "topics": [],
                        "stargazers_count": 1
                    }
                })
            })
            .collect();
        serde_json::Value::Array(entries).to_string()
    }

    #[test]
    fn test_starred_route() {
        assert_eq!(
            starred_route(None, 1).unwrap(),
            "/user/starred?per_page=100&page=1"
        );
        assert_eq!(
            starred_route(Some("octo-cat"), 3).unwrap(),
            "/users/octo-cat/starred?per_page=100&page=3"
        );
    }

    #[test]
    fn test_starred_route_rejects_non_login_names() {
        let too_long = "x".repeat(40);
        for user in ["", "octo/cat", "octocat?page=9", "a&b", "octo cat", too_long.as_str()] {
            assert!(
                matches!(starred_route(Some(user), 1), Err(GitHubError::InvalidUser(_))),
                "{:?} should be rejected",
                user
            );
        }
    }

    #[test]
    fn test_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        assert!(!rate_limit_exhausted(&headers));

        headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
        headers.insert("x-ratelimit-reset", "1700000000".parse().unwrap());
        assert!(rate_limit_exhausted(&headers));
        assert_eq!(rate_limit_reset(&headers).timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn list_starred_follows_pages_until_short_page() {
        let (base, server) = serve(vec![
            Canned::json(200, starred_json(PER_PAGE, 0)),
            Canned::json(200, starred_json(3, PER_PAGE)),
        ])
        .await;

        let client = GitHubClient::with_api_base("ghp_test", &base)
            .unwrap()
            .with_retry_config(fast_retry());
        let items = client.fetch_snapshot(Some("octocat")).await.unwrap();

        assert_eq!(items.len(), PER_PAGE + 3);
        assert_eq!(items[0].full_name, "octocat/repo0");

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /users/octocat/starred?per_page=100&page=1"));
        assert!(requests[1].contains("page=2"));
        assert!(requests[0].to_ascii_lowercase().contains(STAR_MEDIA_TYPE));
    }

    #[tokio::test]
    async fn list_starred_retries_rate_limited_page() {
        let (base, server) = serve(vec![
            Canned::json(403, r#"{"message":"API rate limit exceeded"}"#)
                .with_header("x-ratelimit-remaining", "0")
                .with_header("x-ratelimit-reset", "1700000000"),
            Canned::json(200, "[]"),
        ])
        .await;

        let client = GitHubClient::with_api_base("ghp_test", &base)
            .unwrap()
            .with_retry_config(fast_retry());
        let items = client.fetch_snapshot(None).await.unwrap();

        assert!(items.is_empty());
        assert_eq!(server.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_starred_surfaces_auth_failure() {
        let (base, _server) =
            serve(vec![Canned::json(401, r#"{"message":"Bad credentials"}"#)]).await;

        let client = GitHubClient::with_api_base("ghp_bad", &base)
            .unwrap()
            .with_retry_config(fast_retry());
        let err = client.fetch_snapshot(None).await.unwrap_err();

        assert!(matches!(err, FetchError::AuthRequired));
    }

    #[tokio::test]
    async fn list_starred_rejects_invalid_user_without_requesting() {
        // Nothing listens here; a request would fail with a network error
        let client = GitHubClient::with_api_base("ghp_test", "http://127.0.0.1:9")
            .unwrap()
            .with_retry_config(fast_retry());
        let err = client.fetch_snapshot(Some("../orgs/x")).await.unwrap_err();

        assert!(matches!(err, FetchError::Api { .. }));
        assert!(err.to_string().contains("../orgs/x"));
    }
}
