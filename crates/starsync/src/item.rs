//! Canonical representation of a starred repository and its sync metadata.
//!
//! Three views of the same repository flow through a sync pass:
//!
//! - [`SourceItem`] - what the star source reports right now
//! - [`StoredItem`] - what the record store holds from earlier passes
//! - [`TrackedItem`] - the target state the engine computes and hands to the writer
//!
//! All three are keyed by the repository's full name (`owner/name`).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptive attributes of a repository as seen on the source platform.
///
/// Two descriptors compare equal when every attribute matches. Topics are an
/// unordered set, so the order the platform reports them in never matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Canonical web URL.
    pub url: String,
    /// Free-text description (empty when the repository has none).
    pub description: String,
    /// Primary programming language.
    pub language: Option<String>,
    /// Repository topics.
    pub topics: BTreeSet<String>,
    /// Star count.
    pub stars: u32,
}

/// A repository as reported by the star source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    /// Identity (`owner/name`).
    pub full_name: String,
    /// Current descriptive attributes.
    pub descriptor: Descriptor,
    /// API path the README can be fetched from, if known.
    pub readme_path: Option<String>,
    /// When the user starred the repository (if the source reports it).
    pub starred_at: Option<DateTime<Utc>>,
}

impl SourceItem {
    /// Create a source item with an empty description and no topics.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        let full_name = format!("{}/{}", owner, name);
        Self {
            descriptor: Descriptor {
                url: format!("https://github.com/{}", full_name),
                owner,
                name,
                ..Descriptor::default()
            },
            readme_path: Some(format!("/repos/{}/readme", full_name)),
            full_name,
            starred_at: None,
        }
    }

    /// Set the star count.
    #[must_use]
    pub fn with_stars(mut self, stars: u32) -> Self {
        self.descriptor.stars = stars;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.descriptor.description = description.into();
        self
    }

    /// Set the primary language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.descriptor.language = Some(language.into());
        self
    }

    /// Set the topics.
    #[must_use]
    pub fn with_topics<I, T>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.descriptor.topics = topics.into_iter().map(Into::into).collect();
        self
    }
}

/// Target-side state of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedItem {
    /// Identity (`owner/name`). Never changes once recorded.
    pub full_name: String,
    /// Descriptive attributes as of the last write.
    pub descriptor: Descriptor,
    /// AI-generated summary.
    pub summary: Option<String>,
    /// When the current summary was generated. Set only alongside a non-empty summary.
    pub summary_generated_at: Option<DateTime<Utc>>,
    /// When a summarizer call last completed without error, even with an empty result.
    pub summary_attempted_at: Option<DateTime<Utc>>,
    /// When the record was first written.
    pub created_at: DateTime<Utc>,
    /// When the record was last written.
    pub last_synced_at: DateTime<Utc>,
    /// Whether the repository has disappeared from the source.
    pub archived: bool,
}

/// A tracked item as loaded from the record store.
pub type StoredItem = TrackedItem;

impl TrackedItem {
    /// Build the initial state for a repository seen for the first time.
    pub fn from_source(source: &SourceItem, now: DateTime<Utc>) -> Self {
        Self {
            full_name: source.full_name.clone(),
            descriptor: source.descriptor.clone(),
            summary: None,
            summary_generated_at: None,
            summary_attempted_at: None,
            created_at: now,
            last_synced_at: now,
            archived: false,
        }
    }

    /// Whether the record carries a non-blank summary.
    pub fn has_summary(&self) -> bool {
        self.summary
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// Whether the summary needs no further work.
    ///
    /// A non-empty summary is always settled. A summarizer call that completed
    /// with an empty result settles the record too, unless the caller asks
    /// for empty results to be retried.
    pub fn summary_settled(&self, include_empty_summary: bool) -> bool {
        self.has_summary() || (self.summary_attempted_at.is_some() && !include_empty_summary)
    }

    /// Compare everything except the write timestamps.
    pub fn same_content(&self, other: &Self) -> bool {
        self.full_name == other.full_name
            && self.descriptor == other.descriptor
            && self.summary == other.summary
            && self.summary_generated_at == other.summary_generated_at
            && self.summary_attempted_at == other.summary_attempted_at
            && self.archived == other.archived
    }
}
