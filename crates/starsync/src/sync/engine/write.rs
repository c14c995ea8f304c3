use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use crate::item::{Descriptor, StoredItem, TrackedItem};
use crate::platform::short_error_message;
use crate::store::{RecordWriter, WriteError};

use super::super::progress::{ProgressCallback, SyncProgress, emit};
use super::super::types::{
    EnrichOutcome, FailureStage, RunReport, SyncPlan, SyncPolicy, WriteKind, WriteOp,
};

/// The writes a pass will apply.
#[derive(Debug, Default)]
pub struct WritePlan {
    /// One write per affected identity.
    pub ops: Vec<WriteOp>,
    /// Identities whose update carries a new summary state.
    pub resummarized: HashSet<String>,
    /// Archive writes dropped because of `no_archive`.
    pub archive_suppressed: usize,
    /// Resummarize candidates whose target equals the stored state.
    pub skipped: Vec<String>,
}

/// Apply a summarizer outcome to a target state.
///
/// An empty or failed outcome never clears a summary that is already there.
fn apply_outcome(
    item: &mut TrackedItem,
    outcome: Option<&EnrichOutcome>,
    now: DateTime<Utc>,
) -> bool {
    match outcome {
        Some(EnrichOutcome::Summary(summary)) => {
            item.summary = Some(summary.clone());
            item.summary_generated_at = Some(now);
            item.summary_attempted_at = Some(now);
            true
        }
        Some(EnrichOutcome::Empty) => {
            item.summary_attempted_at = Some(now);
            true
        }
        Some(EnrichOutcome::Failed(_)) | None => false,
    }
}

/// Refreshed copy of a stored record: new descriptor, active, written now.
fn refreshed(stored: &StoredItem, descriptor: &Descriptor, now: DateTime<Utc>) -> TrackedItem {
    let mut target = stored.clone();
    target.descriptor = descriptor.clone();
    target.archived = false;
    target.last_synced_at = now;
    target
}

/// Compute one target state per identity that needs a write.
pub fn assemble_writes(
    plan: &SyncPlan,
    outcomes: &HashMap<String, EnrichOutcome>,
    policy: &SyncPolicy,
    now: DateTime<Utc>,
) -> WritePlan {
    let mut writes = WritePlan::default();

    for source in &plan.to_create {
        let mut item = TrackedItem::from_source(source, now);
        apply_outcome(&mut item, outcomes.get(&source.full_name), now);
        writes.ops.push(WriteOp::Create(item));
    }

    for (source, stored) in &plan.to_resummarize {
        let mut target = refreshed(stored, &source.descriptor, now);
        let applied = apply_outcome(&mut target, outcomes.get(&source.full_name), now);

        if target.same_content(stored) {
            writes.skipped.push(source.full_name.clone());
            continue;
        }
        if applied {
            writes.resummarized.insert(source.full_name.clone());
        }
        writes.ops.push(WriteOp::Update {
            item: target,
            unarchive: stored.archived,
        });
    }

    for (source, stored) in &plan.to_refresh_only {
        writes.ops.push(WriteOp::Update {
            item: refreshed(stored, &source.descriptor, now),
            unarchive: stored.archived,
        });
    }

    for stored in &plan.to_archive {
        if policy.no_archive {
            tracing::debug!(identity = %stored.full_name, "Archive suppressed");
            writes.archive_suppressed += 1;
        } else {
            writes.ops.push(WriteOp::Archive {
                identity: stored.full_name.clone(),
            });
        }
    }

    writes
}

/// Add a successful write to the report.
pub(super) fn count_write(
    report: &mut RunReport,
    kind: WriteKind,
    identity: &str,
    resummarized: &HashSet<String>,
) {
    match kind {
        WriteKind::Created => report.created += 1,
        WriteKind::Archived => report.archived += 1,
        WriteKind::Updated | WriteKind::Unarchived => {
            report.updated += 1;
            if resummarized.contains(identity) {
                report.resummarized += 1;
            } else {
                report.refreshed += 1;
            }
            if kind == WriteKind::Unarchived {
                report.unarchived += 1;
            }
        }
    }
}

async fn apply<W: RecordWriter>(
    writer: &W,
    op: &WriteOp,
    now: DateTime<Utc>,
) -> Result<(), WriteError> {
    match op {
        WriteOp::Create(item) => writer.create(item).await,
        WriteOp::Update { item, .. } => writer.update(item).await,
        WriteOp::Archive { identity } => writer.archive(identity, now).await,
    }
}

/// Apply writes concurrently and record the results in `report`.
///
/// Writes for distinct identities are independent; a failed write is
/// recorded and the rest continue.
pub(super) async fn execute_writes<W>(
    writer: &W,
    writes: WritePlan,
    concurrency: usize,
    now: DateTime<Utc>,
    report: &mut RunReport,
    on_progress: Option<&ProgressCallback>,
) where
    W: RecordWriter + Clone + 'static,
{
    report.archive_suppressed += writes.archive_suppressed;
    report.skipped_unchanged += writes.skipped.len();

    if writes.ops.is_empty() {
        return;
    }

    let concurrency = std::cmp::max(1, std::cmp::min(concurrency, writes.ops.len()));
    let semaphore = Arc::new(Semaphore::new(concurrency));

    emit(
        on_progress,
        SyncProgress::Writing {
            count: writes.ops.len(),
            concurrency,
        },
    );

    let mut handles = Vec::with_capacity(writes.ops.len());

    for op in writes.ops {
        let writer = writer.clone();
        let semaphore = Arc::clone(&semaphore);
        let identity = op.identity().to_string();
        let kind = op.kind();

        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return Err(WriteError::rejected("Semaphore closed unexpectedly")),
            };
            apply(&writer, &op, now).await
        });

        handles.push((identity, kind, handle));
    }

    let (mut written, mut errors) = (0, 0);

    for (identity, kind, handle) in handles {
        let result = match handle.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(short_error_message(&e)),
            Err(e) => Err(format!("Task panic: {}", e)),
        };

        match result {
            Ok(()) => {
                written += 1;
                count_write(report, kind, &identity, &writes.resummarized);
                tracing::debug!(identity = %identity, %kind, "Written");
                emit(on_progress, SyncProgress::Written { identity, kind });
            }
            Err(error) => {
                errors += 1;
                tracing::warn!(identity = %identity, %kind, error = %error, "Write failed");
                report.record_failure(identity.clone(), FailureStage::Write, error.clone());
                emit(on_progress, SyncProgress::WriteError { identity, error });
            }
        }
    }

    emit(on_progress, SyncProgress::WritingComplete { written, errors });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SourceItem;

    fn stored_with_summary(name: &str, summary: &str, at: DateTime<Utc>) -> StoredItem {
        let mut item = TrackedItem::from_source(&SourceItem::new("o", name), at);
        item.summary = Some(summary.to_string());
        item.summary_generated_at = Some(at);
        item.summary_attempted_at = Some(at);
        item
    }

    #[test]
    fn test_create_applies_summary() {
        let now = Utc::now();
        let plan = SyncPlan {
            to_create: vec![SourceItem::new("o", "a"), SourceItem::new("o", "b")],
            ..SyncPlan::default()
        };
        let outcomes = HashMap::from([
            ("o/a".to_string(), EnrichOutcome::Summary("Alpha".to_string())),
            ("o/b".to_string(), EnrichOutcome::Failed("boom".to_string())),
        ]);

        let writes = assemble_writes(&plan, &outcomes, &SyncPolicy::default(), now);
        assert_eq!(writes.ops.len(), 2, "failed summaries still create the item");

        let WriteOp::Create(a) = &writes.ops[0] else {
            panic!("expected create");
        };
        assert_eq!(a.summary.as_deref(), Some("Alpha"));
        assert_eq!(a.summary_generated_at, Some(now));

        let WriteOp::Create(b) = &writes.ops[1] else {
            panic!("expected create");
        };
        assert_eq!(b.summary, None);
        assert_eq!(b.summary_generated_at, None);
        assert_eq!(b.summary_attempted_at, None);
    }

    #[test]
    fn test_empty_outcome_keeps_prior_summary() {
        let earlier = Utc::now() - chrono::Duration::days(3);
        let now = Utc::now();
        let stored = stored_with_summary("a", "Prior", earlier);
        let plan = SyncPlan {
            to_resummarize: vec![(SourceItem::new("o", "a"), stored)],
            ..SyncPlan::default()
        };
        let outcomes = HashMap::from([("o/a".to_string(), EnrichOutcome::Empty)]);

        let writes = assemble_writes(&plan, &outcomes, &SyncPolicy::default(), now);
        let WriteOp::Update { item, unarchive } = &writes.ops[0] else {
            panic!("expected update");
        };
        assert!(!unarchive);
        assert_eq!(item.summary.as_deref(), Some("Prior"));
        assert_eq!(item.summary_generated_at, Some(earlier));
        assert_eq!(item.summary_attempted_at, Some(now));
        assert!(writes.resummarized.contains("o/a"));
    }

    #[test]
    fn test_failed_resummary_with_nothing_changed_is_skipped() {
        let now = Utc::now();
        let stored = TrackedItem::from_source(&SourceItem::new("o", "a"), now);
        let plan = SyncPlan {
            to_resummarize: vec![(SourceItem::new("o", "a"), stored)],
            ..SyncPlan::default()
        };
        let outcomes = HashMap::from([(
            "o/a".to_string(),
            EnrichOutcome::Failed("x".to_string()),
        )]);

        let writes = assemble_writes(&plan, &outcomes, &SyncPolicy::default(), now);
        assert!(writes.ops.is_empty());
        assert_eq!(writes.skipped, vec!["o/a"]);
    }

    #[test]
    fn test_refresh_unarchives() {
        let now = Utc::now();
        let mut stored = stored_with_summary("a", "s", now);
        stored.archived = true;
        let plan = SyncPlan {
            to_refresh_only: vec![(SourceItem::new("o", "a").with_stars(7), stored)],
            ..SyncPlan::default()
        };

        let writes = assemble_writes(&plan, &HashMap::new(), &SyncPolicy::default(), now);
        let WriteOp::Update { item, unarchive } = &writes.ops[0] else {
            panic!("expected update");
        };
        assert!(unarchive);
        assert!(!item.archived);
        assert_eq!(item.descriptor.stars, 7);
        assert_eq!(item.summary.as_deref(), Some("s"));
    }

    #[test]
    fn test_no_archive_suppresses_archive_ops() {
        let now = Utc::now();
        let plan = SyncPlan {
            to_archive: vec![stored_with_summary("gone", "s", now)],
            ..SyncPlan::default()
        };
        let policy = SyncPolicy {
            no_archive: true,
            ..SyncPolicy::default()
        };

        let writes = assemble_writes(&plan, &HashMap::new(), &policy, now);
        assert!(writes.ops.is_empty());
        assert_eq!(writes.archive_suppressed, 1);

        let writes = assemble_writes(&plan, &HashMap::new(), &SyncPolicy::default(), now);
        assert_eq!(
            writes.ops,
            vec![WriteOp::Archive {
                identity: "o/gone".to_string()
            }]
        );
    }

    #[test]
    fn test_count_write_buckets() {
        let mut report = RunReport::default();
        let resummarized = HashSet::from(["o/a".to_string()]);

        count_write(&mut report, WriteKind::Updated, "o/a", &resummarized);
        count_write(&mut report, WriteKind::Unarchived, "o/b", &resummarized);
        count_write(&mut report, WriteKind::Created, "o/c", &resummarized);

        assert_eq!(report.updated, 2);
        assert_eq!(report.resummarized, 1);
        assert_eq!(report.refreshed, 1);
        assert_eq!(report.unarchived, 1);
        assert_eq!(report.created, 1);
    }
}
