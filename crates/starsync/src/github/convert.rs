//! Conversion from GitHub API types to source items.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::error::GitHubError;
use super::types::{README_MAX_CHARS, ReadmeResponse, StarredEntry, TRUNCATION_MARKER};
use crate::item::{Descriptor, SourceItem};

/// Convert a starred entry into a source item.
pub fn to_source_item(entry: StarredEntry) -> SourceItem {
    let repo = entry.repo;
    let readme_path = Some(format!("/repos/{}/readme", repo.full_name));
    SourceItem {
        descriptor: Descriptor {
            owner: repo.owner.login,
            name: repo.name,
            url: repo.html_url,
            description: repo.description.unwrap_or_default(),
            language: repo.language.filter(|l| !l.is_empty()),
            topics: repo.topics.into_iter().collect(),
            stars: repo.stargazers_count,
        },
        full_name: repo.full_name,
        readme_path,
        starred_at: entry.starred_at,
    }
}

/// Decode README content and cap it at [`README_MAX_CHARS`] characters.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn decode_readme(readme: &ReadmeResponse) -> Result<String, GitHubError> {
    if let Some(encoding) = readme.encoding.as_deref()
        && encoding != "base64"
    {
        return Err(GitHubError::Decode(format!(
            "unsupported README encoding: {}",
            encoding
        )));
    }

    let compact: String = readme
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| GitHubError::Decode(e.to_string()))?;

    Ok(truncate_readme(String::from_utf8_lossy(&bytes).into_owned()))
}

fn truncate_readme(mut content: String) -> String {
    if let Some((idx, _)) = content.char_indices().nth(README_MAX_CHARS) {
        content.truncate(idx);
        content.push_str(TRUNCATION_MARKER);
    }
    content
}
