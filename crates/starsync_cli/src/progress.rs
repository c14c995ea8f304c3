//! Progress reporting for sync passes.
//!
//! Two modes:
//! - Interactive mode (TTY): progress bars using indicatif
//! - Logging mode (non-TTY): structured logging using tracing

mod interactive;
mod logging;

use std::sync::Arc;

use console::Term;
use starsync::sync::{ProgressCallback, SyncProgress};

pub use interactive::InteractiveReporter;
pub use logging::LoggingReporter;

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    /// Interactive progress bars for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter::new())
        }
    }

    /// Handle a progress event.
    pub fn handle(&self, event: SyncProgress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// Convert to a ProgressCallback for the library.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| {
            reporter.handle(event);
        })
    }

    /// Finish all progress bars (interactive mode only).
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::interactive::Phase;
    use super::*;

    #[test]
    fn test_logging_reporter_accepts_every_event() {
        let reporter = Arc::new(ProgressReporter::Logging(LoggingReporter::new()));
        let callback = reporter.as_callback();

        callback(SyncProgress::FetchingSnapshot { user: None });
        callback(SyncProgress::Planned {
            to_create: 1,
            to_resummarize: 0,
            to_refresh_only: 0,
            to_archive: 0,
            unchanged: 3,
            dry_run: false,
        });
        callback(SyncProgress::Warning {
            message: "README unavailable".to_string(),
        });
        reporter.finish();
    }

    #[test]
    fn test_interactive_reporter_tracks_phases() {
        let reporter = InteractiveReporter::hidden();

        reporter.handle(SyncProgress::FetchingSnapshot {
            user: Some("octocat".to_string()),
        });
        reporter.handle(SyncProgress::FetchedPage {
            page: 1,
            count: 100,
            total_so_far: 100,
        });
        reporter.handle(SyncProgress::FetchComplete { total: 100 });
        reporter.handle(SyncProgress::Summarizing {
            count: 2,
            concurrency: 2,
        });
        reporter.handle(SyncProgress::Summarized {
            identity: "o/a".to_string(),
            empty: false,
        });
        reporter.handle(SyncProgress::SummarizeError {
            identity: "o/b".to_string(),
            error: "HTTP 500".to_string(),
        });
        assert_eq!(reporter.position(Phase::Summarize), Some(2));

        reporter.handle(SyncProgress::Writing {
            count: 1,
            concurrency: 1,
        });
        assert_eq!(reporter.position(Phase::Write), Some(0));
        reporter.finish();
    }
}
