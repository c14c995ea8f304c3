use starsync::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::FetchingSnapshot { user } => {
                tracing::info!(
                    user = user.as_deref().unwrap_or("<authenticated>"),
                    "Fetching starred repositories"
                );
            }

            SyncProgress::FetchedPage {
                page,
                count,
                total_so_far,
            } => {
                tracing::debug!(page, count, total_so_far, "Fetched page");
            }

            SyncProgress::FetchComplete { total } => {
                tracing::info!(total, "Fetch complete");
            }

            SyncProgress::RecordsLoaded { total } => {
                tracing::info!(total, "Loaded stored records");
            }

            SyncProgress::Planned {
                to_create,
                to_resummarize,
                to_refresh_only,
                to_archive,
                unchanged,
                dry_run,
            } => {
                tracing::info!(
                    to_create,
                    to_resummarize,
                    to_refresh_only,
                    to_archive,
                    unchanged,
                    dry_run,
                    "Planned"
                );
            }

            SyncProgress::Summarizing { count, concurrency } => {
                tracing::info!(count, concurrency, "Summarizing repositories");
            }

            SyncProgress::Summarized { identity, empty } => {
                if empty {
                    tracing::info!(repo = %identity, "Empty summary");
                } else {
                    tracing::debug!(repo = %identity, "Summarized");
                }
            }

            SyncProgress::SummarizeError { identity, error } => {
                tracing::warn!(repo = %identity, error = %error, "Failed to summarize");
            }

            SyncProgress::SummarizingComplete {
                summarized,
                empty,
                errors,
            } => {
                tracing::info!(summarized, empty, errors, "Summarizing complete");
            }

            SyncProgress::Writing { count, concurrency } => {
                tracing::info!(count, concurrency, "Writing records");
            }

            SyncProgress::Written { identity, kind } => {
                tracing::debug!(repo = %identity, kind = %kind, "Saved to database");
            }

            SyncProgress::WriteError { identity, error } => {
                tracing::error!(repo = %identity, error = %error, "Failed to save");
            }

            SyncProgress::WritingComplete { written, errors } => {
                tracing::info!(written, errors, "Writing complete");
            }

            SyncProgress::Warning { message } => {
                tracing::warn!(message = %message, "Warning");
            }

            SyncProgress::RateLimitBackoff {
                target,
                retry_after_ms,
                attempt,
            } => {
                tracing::warn!(
                    request = %target,
                    retry_after_ms,
                    attempt,
                    "Rate limited, backing off"
                );
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
