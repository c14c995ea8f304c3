use async_trait::async_trait;

use crate::item::SourceItem;

use super::errors::Result;

/// A source of starred repositories.
///
/// # Implementation Notes
///
/// Implementors should:
/// - Handle pagination internally and return the complete collection
/// - Return `Ok(vec![])` only when the user genuinely has no stars; any
///   transport or auth failure must surface as an error, never as an empty list
/// - Preserve the platform's ordering, which `limit` truncation relies on
#[async_trait]
pub trait StarSource: Send + Sync {
    /// Fetch every repository starred by `user`, or by the authenticated
    /// user when `user` is `None`.
    async fn fetch_snapshot(&self, user: Option<&str>) -> Result<Vec<SourceItem>>;

    /// Fetch the README text for a repository.
    ///
    /// Returns `Ok(None)` when the repository has no README.
    async fn fetch_readme(&self, item: &SourceItem) -> Result<Option<String>>;
}
