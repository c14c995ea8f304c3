//! Progress reporting types for sync operations.
//!
//! The engine and the collaborators report what they are doing through
//! [`SyncProgress`] events. Front ends decide how to render them.

use super::types::WriteKind;

/// Progress events emitted during a sync pass.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Starting to fetch the starred snapshot.
    FetchingSnapshot {
        /// Whose stars are fetched (`None` for the authenticated user).
        user: Option<String>,
    },

    /// Fetched a page of starred repositories.
    FetchedPage {
        /// Page number (1-indexed).
        page: u32,
        /// Number of repos on this page.
        count: usize,
        /// Running total of repos fetched so far.
        total_so_far: usize,
    },

    /// Finished fetching the snapshot.
    FetchComplete {
        /// Total number of repositories in the snapshot.
        total: usize,
    },

    /// Loaded the stored records.
    RecordsLoaded {
        /// Number of stored records.
        total: usize,
    },

    /// Classification finished.
    Planned {
        /// New identities.
        to_create: usize,
        /// Stored identities that need a new summary.
        to_resummarize: usize,
        /// Stored identities that only need descriptive attributes refreshed.
        to_refresh_only: usize,
        /// Stored identities gone from the snapshot.
        to_archive: usize,
        /// Identities needing no write.
        unchanged: usize,
        /// Whether this is a dry run.
        dry_run: bool,
    },

    /// Starting summarization.
    Summarizing {
        /// Number of items to summarize.
        count: usize,
        /// Maximum summarizer calls in flight.
        concurrency: usize,
    },

    /// A summarizer call completed.
    Summarized {
        /// Identity of the item.
        identity: String,
        /// True if the summary came back empty.
        empty: bool,
    },

    /// A summarizer call failed.
    SummarizeError {
        /// Identity of the item.
        identity: String,
        /// Error message.
        error: String,
    },

    /// Summarization phase complete.
    SummarizingComplete {
        /// Non-empty summaries produced.
        summarized: usize,
        /// Empty summaries.
        empty: usize,
        /// Failed calls.
        errors: usize,
    },

    /// Starting to apply writes.
    Writing {
        /// Number of writes.
        count: usize,
        /// Maximum writes in flight.
        concurrency: usize,
    },

    /// A write succeeded.
    Written {
        /// Identity of the item.
        identity: String,
        /// What kind of write it was.
        kind: WriteKind,
    },

    /// A write failed.
    WriteError {
        /// Identity of the item.
        identity: String,
        /// Error message.
        error: String,
    },

    /// Write phase complete.
    WritingComplete {
        /// Successful writes.
        written: usize,
        /// Failed writes.
        errors: usize,
    },

    /// Warning message (non-fatal).
    Warning {
        /// Warning message.
        message: String,
    },

    /// Rate limited, backing off before retry.
    RateLimitBackoff {
        /// What was being requested (identity or page).
        target: String,
        /// Time to wait before retry (ms).
        retry_after_ms: u64,
        /// Current attempt number.
        attempt: u32,
    },
}

/// Callback for progress updates during sync operations.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
///
/// # Example
///
/// ```ignore
/// use starsync::sync::{emit, SyncProgress, ProgressCallback};
///
/// fn report(on_progress: Option<&ProgressCallback>) {
///     emit(on_progress, SyncProgress::FetchComplete { total: 42 });
/// }
/// ```
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
