//! Sync policy, plan and report types.

use crate::item::{SourceItem, StoredItem, TrackedItem};

/// Default number of summarizer calls (and writes) in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default language summaries are written in.
pub const DEFAULT_TARGET_LANGUAGE: &str = "English";

/// Maximum backoff delay in milliseconds when rate limited.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Maximum retries for a single rate-limited request.
pub const MAX_RETRIES: u32 = 4;

/// Knobs for one sync pass.
///
/// The engine reads nothing else; callers build this from configuration and
/// command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Regenerate summaries even for records that already have one.
    pub force_resummarize: bool,
    /// Compute and report the plan without summarizing or writing.
    pub dry_run: bool,
    /// Only process the first N items of the snapshot.
    pub limit: Option<usize>,
    /// Never archive records that disappeared from the snapshot.
    pub no_archive: bool,
    /// Retry summarization for records whose last summary came back empty.
    pub include_empty_summary: bool,
    /// Maximum number of summarizer calls (and writes) in flight.
    pub concurrency: usize,
    /// Language summaries are written in.
    pub target_language: String,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            force_resummarize: false,
            dry_run: false,
            limit: None,
            no_archive: false,
            include_empty_summary: false,
            concurrency: DEFAULT_CONCURRENCY,
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
        }
    }
}

/// Classification of a snapshot against the stored records.
///
/// Every identity that needs work appears in exactly one of the four work
/// lists. Each list is sorted by identity.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    /// In the snapshot, never stored.
    pub to_create: Vec<SourceItem>,
    /// Stored, needs a new summary.
    pub to_resummarize: Vec<(SourceItem, StoredItem)>,
    /// Stored, needs descriptive attributes refreshed or un-archival, but no summary.
    pub to_refresh_only: Vec<(SourceItem, StoredItem)>,
    /// Stored, active, gone from the snapshot.
    pub to_archive: Vec<StoredItem>,
    /// Identities that need no write at all.
    pub unchanged: Vec<String>,
}

impl SyncPlan {
    /// Number of identities that need summarization.
    pub fn enrich_count(&self) -> usize {
        self.to_create.len() + self.to_resummarize.len()
    }

    /// Whether the plan contains no work.
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty()
            && self.to_resummarize.is_empty()
            && self.to_refresh_only.is_empty()
            && self.to_archive.is_empty()
    }
}

/// Result of summarizing a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// The summarizer produced a non-empty summary.
    Summary(String),
    /// The summarizer completed but returned nothing usable.
    Empty,
    /// The summarizer (or its task) failed.
    Failed(String),
}

/// One write against the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// First write for a new identity.
    Create(TrackedItem),
    /// Overwrite of an existing record.
    Update {
        /// The complete target state.
        item: TrackedItem,
        /// Whether this write clears a previous archival.
        unarchive: bool,
    },
    /// Flag a record as archived.
    Archive {
        /// The identity to archive.
        identity: String,
    },
}

impl WriteOp {
    /// The identity this write targets.
    pub fn identity(&self) -> &str {
        match self {
            Self::Create(item) | Self::Update { item, .. } => &item.full_name,
            Self::Archive { identity } => identity,
        }
    }

    /// The kind of write, for reporting.
    pub fn kind(&self) -> WriteKind {
        match self {
            Self::Create(_) => WriteKind::Created,
            Self::Update {
                unarchive: true, ..
            } => WriteKind::Unarchived,
            Self::Update { .. } => WriteKind::Updated,
            Self::Archive { .. } => WriteKind::Archived,
        }
    }
}

/// Kind of a completed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// A new record was created.
    Created,
    /// An existing record was overwritten.
    Updated,
    /// An archived record reappeared and was restored.
    Unarchived,
    /// A record was archived.
    Archived,
}

impl std::fmt::Display for WriteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unarchived => "unarchived",
            Self::Archived => "archived",
        };
        f.write_str(label)
    }
}

/// Stage of a pass an item failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Summarization failed; the item may still have been written.
    Summarize,
    /// The store rejected the write.
    Write,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summarize => f.write_str("summarize"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// A per-item failure recorded during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Identity of the failed item.
    pub identity: String,
    /// Where it failed.
    pub stage: FailureStage,
    /// Short error message.
    pub reason: String,
}

/// Outcome of a pass that was not aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The plan was empty.
    NothingToDo,
    /// Every planned item succeeded.
    Completed,
    /// The pass finished but this many item failures were recorded.
    CompletedWithFailures(usize),
}

/// Counters and failures for one pass.
///
/// In a dry run the counters describe what the pass would have done.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Records created.
    pub created: usize,
    /// Records updated (resummarized, refreshed or unarchived).
    pub updated: usize,
    /// Updates that carried a resummarization.
    pub resummarized: usize,
    /// Updates that only refreshed descriptive attributes.
    pub refreshed: usize,
    /// Updates that cleared an archival.
    pub unarchived: usize,
    /// Records archived.
    pub archived: usize,
    /// Archive writes suppressed by `no_archive`.
    pub archive_suppressed: usize,
    /// Identities that needed no write.
    pub skipped_unchanged: usize,
    /// Summarizer calls that produced a summary.
    pub summarized: usize,
    /// Summarizer calls that returned an empty summary.
    pub empty_summaries: usize,
    /// Summarizer calls that failed.
    pub summarize_failed: usize,
    /// Writes that failed.
    pub write_failed: usize,
    /// Every item failure, summarize and write stages alike.
    pub failures: Vec<ItemFailure>,
}

impl RunReport {
    /// Classify the pass.
    pub fn outcome(&self) -> RunOutcome {
        if !self.failures.is_empty() {
            return RunOutcome::CompletedWithFailures(self.failures.len());
        }
        if self.created + self.updated + self.archived + self.archive_suppressed == 0
            && self.summarized + self.empty_summaries == 0
        {
            return RunOutcome::NothingToDo;
        }
        RunOutcome::Completed
    }

    /// Total writes applied (or planned, in a dry run).
    pub fn writes(&self) -> usize {
        self.created + self.updated + self.archived
    }

    pub(crate) fn record_failure(
        &mut self,
        identity: impl Into<String>,
        stage: FailureStage,
        reason: impl Into<String>,
    ) {
        match stage {
            FailureStage::Summarize => self.summarize_failed += 1,
            FailureStage::Write => self.write_failed += 1,
        }
        self.failures.push(ItemFailure {
            identity: identity.into(),
            stage,
            reason: reason.into(),
        });
    }
}
