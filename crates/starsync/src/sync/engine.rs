//! Reconciliation engine.
//!
//! A pass runs in four steps:
//!
//! 1. [`plan`] diffs the source snapshot against the stored records
//! 2. items that need a summary fan out to the [`Summarizer`] under a semaphore
//! 3. one target state is computed per affected identity
//! 4. the resulting writes fan out to the [`RecordWriter`] under the same cap
//!
//! Item failures in steps 2 and 4 are recorded in the [`RunReport`] and never
//! abort the pass. Only a failure to obtain either collection does.
//!
//! # Example
//!
//! ```ignore
//! use starsync::sync::{SyncPolicy, sync_starred};
//!
//! let store = DbStore::new(db);
//! let report = sync_starred(None, &SyncPolicy::default(), &github, &store, &summarizer, &store, None).await?;
//! println!("{} created, {} archived", report.created, report.archived);
//! ```

mod classify;
mod enrich;
mod write;

use chrono::Utc;

use super::error::SyncError;
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{EnrichOutcome, FailureStage, RunReport, SyncPlan, SyncPolicy};
use crate::item::{SourceItem, StoredItem};
use crate::platform::StarSource;
use crate::store::{RecordIndex, RecordWriter};
use crate::summarize::Summarizer;

pub use classify::plan;
pub use write::{WritePlan, assemble_writes};

/// Fill a report with what `plan` would do, without doing it.
fn planned_report(plan: &SyncPlan, policy: &SyncPolicy) -> RunReport {
    let unarchived = plan
        .to_resummarize
        .iter()
        .chain(plan.to_refresh_only.iter())
        .filter(|(_, stored)| stored.archived)
        .count();

    let mut report = RunReport {
        dry_run: true,
        created: plan.to_create.len(),
        updated: plan.to_resummarize.len() + plan.to_refresh_only.len(),
        resummarized: plan.to_resummarize.len(),
        refreshed: plan.to_refresh_only.len(),
        unarchived,
        skipped_unchanged: plan.unchanged.len(),
        ..RunReport::default()
    };

    if policy.no_archive {
        report.archive_suppressed = plan.to_archive.len();
    } else {
        report.archived = plan.to_archive.len();
    }

    report
}

/// Run one pass over collections that have already been fetched.
///
/// # Errors
/// Returns `SyncError::Index` if `existing` holds two records with the same
/// identity. Nothing is written in that case.
#[tracing::instrument(skip_all, fields(snapshot = snapshot.len(), existing = existing.len()))]
pub async fn reconcile<S, M, W>(
    snapshot: &[SourceItem],
    existing: &[StoredItem],
    policy: &SyncPolicy,
    source: &S,
    summarizer: &M,
    writer: &W,
    on_progress: Option<&ProgressCallback>,
) -> Result<RunReport, SyncError>
where
    S: StarSource + Clone + 'static,
    M: Summarizer + Clone + 'static,
    W: RecordWriter + Clone + 'static,
{
    let plan = plan(snapshot, existing, policy)?;

    tracing::info!(
        to_create = plan.to_create.len(),
        to_resummarize = plan.to_resummarize.len(),
        to_refresh_only = plan.to_refresh_only.len(),
        to_archive = plan.to_archive.len(),
        unchanged = plan.unchanged.len(),
        dry_run = policy.dry_run,
        "Planned sync"
    );

    emit(
        on_progress,
        SyncProgress::Planned {
            to_create: plan.to_create.len(),
            to_resummarize: plan.to_resummarize.len(),
            to_refresh_only: plan.to_refresh_only.len(),
            to_archive: plan.to_archive.len(),
            unchanged: plan.unchanged.len(),
            dry_run: policy.dry_run,
        },
    );

    if policy.dry_run {
        return Ok(planned_report(&plan, policy));
    }

    let mut report = RunReport {
        skipped_unchanged: plan.unchanged.len(),
        ..RunReport::default()
    };

    let mut to_enrich: Vec<SourceItem> = Vec::with_capacity(plan.enrich_count());
    to_enrich.extend(plan.to_create.iter().cloned());
    to_enrich.extend(plan.to_resummarize.iter().map(|(source, _)| source.clone()));
    tracing::debug!(count = to_enrich.len(), "Summarizing");

    let outcomes = enrich::enrich_items(
        source,
        summarizer,
        to_enrich,
        policy.concurrency,
        &policy.target_language,
        on_progress,
    )
    .await;

    // Sorted so failures are reported in a stable order
    let mut identities: Vec<&String> = outcomes.keys().collect();
    identities.sort();
    for identity in identities {
        match &outcomes[identity] {
            EnrichOutcome::Summary(_) => report.summarized += 1,
            EnrichOutcome::Empty => report.empty_summaries += 1,
            EnrichOutcome::Failed(reason) => {
                report.record_failure(identity.as_str(), FailureStage::Summarize, reason.as_str());
            }
        }
    }

    let now = Utc::now();
    let writes = assemble_writes(&plan, &outcomes, policy, now);
    write::execute_writes(writer, writes, policy.concurrency, now, &mut report, on_progress).await;

    tracing::info!(
        created = report.created,
        updated = report.updated,
        archived = report.archived,
        archive_suppressed = report.archive_suppressed,
        skipped = report.skipped_unchanged,
        failures = report.failures.len(),
        "Sync pass finished"
    );

    Ok(report)
}

/// Fetch both collections and run one pass.
///
/// `user` selects whose stars are synced; `None` means the authenticated user.
///
/// # Errors
/// Returns `SyncError::Fetch` if the snapshot cannot be fetched and
/// `SyncError::Index` if the stored records cannot be loaded. Either aborts
/// the pass before anything is written.
#[tracing::instrument(skip_all, fields(user = user.unwrap_or("<authenticated>")))]
pub async fn sync_starred<S, I, M, W>(
    user: Option<&str>,
    policy: &SyncPolicy,
    source: &S,
    index: &I,
    summarizer: &M,
    writer: &W,
    on_progress: Option<&ProgressCallback>,
) -> Result<RunReport, SyncError>
where
    S: StarSource + Clone + 'static,
    I: RecordIndex,
    M: Summarizer + Clone + 'static,
    W: RecordWriter + Clone + 'static,
{
    emit(
        on_progress,
        SyncProgress::FetchingSnapshot {
            user: user.map(str::to_string),
        },
    );

    let snapshot = source.fetch_snapshot(user).await.inspect_err(|e| {
        tracing::error!(error = %e, "Snapshot fetch failed, aborting");
    })?;
    emit(
        on_progress,
        SyncProgress::FetchComplete {
            total: snapshot.len(),
        },
    );

    let existing = index.load_records().await.inspect_err(|e| {
        tracing::error!(error = %e, "Loading stored records failed, aborting");
    })?;
    emit(
        on_progress,
        SyncProgress::RecordsLoaded {
            total: existing.len(),
        },
    );

    reconcile(
        &snapshot,
        &existing,
        policy,
        source,
        summarizer,
        writer,
        on_progress,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::TrackedItem;

    #[test]
    fn test_planned_report_counts() {
        let now = Utc::now();
        let mut archived = TrackedItem::from_source(&SourceItem::new("o", "back"), now);
        archived.archived = true;
        let gone = TrackedItem::from_source(&SourceItem::new("o", "gone"), now);

        let plan = SyncPlan {
            to_create: vec![SourceItem::new("o", "new")],
            to_refresh_only: vec![(SourceItem::new("o", "back"), archived)],
            to_archive: vec![gone],
            unchanged: vec!["o/same".to_string()],
            ..SyncPlan::default()
        };

        let report = planned_report(&plan, &SyncPolicy::default());
        assert!(report.dry_run);
        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.refreshed, 1);
        assert_eq!(report.unarchived, 1);
        assert_eq!(report.archived, 1);
        assert_eq!(report.skipped_unchanged, 1);

        let policy = SyncPolicy {
            no_archive: true,
            ..SyncPolicy::default()
        };
        let report = planned_report(&plan, &policy);
        assert_eq!(report.archived, 0);
        assert_eq!(report.archive_suppressed, 1);
    }

    #[test]
    fn test_enrich_count_covers_new_and_resummarized() {
        let now = Utc::now();
        let stored = TrackedItem::from_source(&SourceItem::new("o", "old"), now);
        let existing = vec![stored];
        let snapshot = vec![
            SourceItem::new("o", "old"),
            SourceItem::new("o", "new"),
            SourceItem::new("o", "newer"),
        ];

        let plan = plan(&snapshot, &existing, &SyncPolicy::default()).expect("plan");
        assert_eq!(plan.to_create.len(), 2);
        assert_eq!(plan.to_resummarize.len(), 1);
        assert_eq!(plan.enrich_count(), 3);
    }
}
