//! Starsync - keep a database of your GitHub stars, with AI summaries.
//!
//! Each run fetches the starred repositories, diffs them against the stored
//! records, summarizes new entries and applies the minimal set of writes.
//! Running it twice in a row with nothing changed writes nothing the second
//! time.
//!
//! # Features
//!
//! - `github` - the [`github::GitHubClient`] star source
//! - `openai` - the [`summarize::OpenAiSummarizer`]
//! - `migrate` - schema migrations and [`connect_and_migrate`]
//! - `sqlite` / `postgres` - database drivers
//!
//! # Example
//!
//! ```ignore
//! use starsync::{DbStore, SyncPolicy, connect_and_migrate, sync_starred};
//!
//! let db = connect_and_migrate("sqlite://starsync.db?mode=rwc").await?;
//! let store = DbStore::new(db);
//! let report = sync_starred(None, &SyncPolicy::default(), &github, &store, &summarizer, &store, None).await?;
//! ```

pub mod db;
pub mod entity;
pub mod item;
pub mod platform;
pub mod repository;
pub mod retry;
pub mod store;
pub mod summarize;
pub mod sync;

#[cfg(feature = "github")]
pub mod github;

#[cfg(feature = "migrate")]
pub mod migration;

#[cfg(all(test, any(feature = "github", feature = "openai")))]
mod test_support;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use item::{Descriptor, SourceItem, StoredItem, TrackedItem};
pub use platform::{FetchError, StarSource};
pub use repository::RepositoryError;
pub use store::{DbStore, IndexError, RecordIndex, RecordWriter, WriteError};
pub use summarize::{SummarizeError, SummaryRequest, Summarizer};
pub use sync::{RunOutcome, RunReport, SyncError, SyncPolicy, reconcile, sync_starred};
