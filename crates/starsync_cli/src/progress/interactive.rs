use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use starsync::sync::SyncProgress;

/// A phase of a pass that gets its own bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetch,
    Summarize,
    Write,
}

/// Consolidated progress state to avoid multiple mutex locks.
#[derive(Default)]
struct ProgressState {
    /// Spinner while pages are fetched.
    fetch_bar: Option<ProgressBar>,
    /// Bar for summarizer calls.
    summarize_bar: Option<ProgressBar>,
    /// Bar for database writes.
    write_bar: Option<ProgressBar>,
    summarize_errors: usize,
    write_errors: usize,
}

impl ProgressState {
    fn bar(&self, phase: Phase) -> Option<&ProgressBar> {
        match phase {
            Phase::Fetch => self.fetch_bar.as_ref(),
            Phase::Summarize => self.summarize_bar.as_ref(),
            Phase::Write => self.write_bar.as_ref(),
        }
    }
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    /// A reporter that draws nothing.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden()),
            state: Mutex::new(ProgressState::default()),
        }
    }

    /// Current position of a phase's bar, if that phase has started.
    #[cfg(test)]
    pub fn position(&self, phase: Phase) -> Option<u64> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.bar(phase).map(ProgressBar::position)
    }

    fn add_bar(&self, len: usize, prefix: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new(len as u64));
        pb.set_style(Self::bar_style());
        pb.set_prefix(format!("{:10}", prefix));
        pb
    }

    pub fn handle(&self, event: SyncProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            SyncProgress::FetchingSnapshot { user } => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(std::time::Duration::from_millis(100));
                pb.set_prefix(format!("{:10}", "stars"));
                pb.set_message(match user {
                    Some(user) => format!("Fetching stars of {}...", user),
                    None => "Fetching your stars...".to_string(),
                });
                state.fetch_bar = Some(pb);
            }

            SyncProgress::FetchedPage {
                page, total_so_far, ..
            } => {
                if let Some(pb) = state.bar(Phase::Fetch) {
                    pb.set_position(total_so_far as u64);
                    pb.set_message(format!("page {} ({} repos)", page, total_so_far));
                }
            }

            SyncProgress::FetchComplete { total } => {
                if let Some(pb) = state.bar(Phase::Fetch) {
                    pb.finish_with_message(format!("{} starred repos", total));
                }
            }

            SyncProgress::Summarizing { count, .. } => {
                let pb = self.add_bar(count, "summarize");
                pb.set_message("Summarizing...");
                state.summarize_bar = Some(pb);
            }

            SyncProgress::Summarized { identity, .. } => {
                if let Some(pb) = state.bar(Phase::Summarize) {
                    pb.inc(1);
                    pb.set_message(identity);
                }
            }

            SyncProgress::SummarizeError { identity, error } => {
                state.summarize_errors += 1;
                if let Some(pb) = state.bar(Phase::Summarize) {
                    pb.inc(1);
                    pb.println(format!("  ✗ {}: {}", identity, error));
                }
            }

            SyncProgress::SummarizingComplete {
                summarized, empty, ..
            } => {
                let errors = state.summarize_errors;
                if let Some(pb) = state.bar(Phase::Summarize) {
                    pb.finish_with_message(format!(
                        "{} summarized, {} empty, {} failed",
                        summarized, empty, errors
                    ));
                }
            }

            SyncProgress::Writing { count, .. } => {
                let pb = self.add_bar(count, "save");
                pb.set_message("Saving...");
                state.write_bar = Some(pb);
            }

            SyncProgress::Written { identity, kind } => {
                if let Some(pb) = state.bar(Phase::Write) {
                    pb.inc(1);
                    pb.set_message(format!("{} {}", kind, identity));
                }
            }

            SyncProgress::WriteError { identity, error } => {
                state.write_errors += 1;
                if let Some(pb) = state.bar(Phase::Write) {
                    pb.inc(1);
                    pb.println(format!("  ✗ {}: {}", identity, error));
                }
            }

            SyncProgress::WritingComplete { written, .. } => {
                let errors = state.write_errors;
                if let Some(pb) = state.bar(Phase::Write) {
                    pb.finish_with_message(format!("{} saved, {} failed", written, errors));
                }
            }

            SyncProgress::Warning { message } => {
                let _ = self.multi.println(format!("  ⚠ {}", message));
            }

            SyncProgress::RateLimitBackoff {
                target,
                retry_after_ms,
                attempt,
            } => {
                let _ = self.multi.println(format!(
                    "  ⏳ rate limited on {} (attempt {}), retrying in {:.1}s",
                    target,
                    attempt,
                    retry_after_ms as f64 / 1000.0
                ));
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for phase in [Phase::Fetch, Phase::Summarize, Phase::Write] {
            if let Some(pb) = state.bar(phase)
                && !pb.is_finished()
            {
                pb.finish();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
