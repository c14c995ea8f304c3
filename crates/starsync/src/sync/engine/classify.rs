use std::collections::{BTreeMap, HashSet};

use crate::item::{SourceItem, StoredItem};
use crate::store::IndexError;

use super::super::types::{SyncPlan, SyncPolicy};

/// Diff a snapshot against the stored records.
///
/// Duplicate identities in the snapshot collapse to their first occurrence.
/// `policy.limit` keeps only the first N distinct snapshot items; stored
/// records beyond the limit are left alone, but archival is still decided
/// against the full snapshot. `no_archive` is applied later, at write time.
///
/// # Errors
/// Returns `IndexError::DuplicateIdentity` if two stored records share an identity.
pub fn plan(
    snapshot: &[SourceItem],
    existing: &[StoredItem],
    policy: &SyncPolicy,
) -> Result<SyncPlan, IndexError> {
    let index = index_by_identity(existing)?;

    let mut seen: HashSet<&str> = HashSet::with_capacity(snapshot.len());
    let mut distinct: Vec<&SourceItem> = Vec::with_capacity(snapshot.len());
    for item in snapshot {
        if seen.insert(item.full_name.as_str()) {
            distinct.push(item);
        } else {
            tracing::warn!(identity = %item.full_name, "Duplicate identity in snapshot, keeping first");
        }
    }

    let limit = policy.limit.unwrap_or(usize::MAX);
    let mut plan = SyncPlan::default();

    for item in distinct.into_iter().take(limit) {
        let Some(stored) = index.get(item.full_name.as_str()) else {
            plan.to_create.push(item.clone());
            continue;
        };

        if policy.force_resummarize || !stored.summary_settled(policy.include_empty_summary) {
            plan.to_resummarize.push((item.clone(), (*stored).clone()));
        } else if stored.archived || stored.descriptor != item.descriptor {
            plan.to_refresh_only.push((item.clone(), (*stored).clone()));
        } else {
            plan.unchanged.push(item.full_name.clone());
        }
    }

    plan.to_archive = index
        .values()
        .filter(|stored| !stored.archived && !seen.contains(stored.full_name.as_str()))
        .map(|stored| (*stored).clone())
        .collect();

    plan.to_create.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    plan.to_resummarize
        .sort_by(|a, b| a.0.full_name.cmp(&b.0.full_name));
    plan.to_refresh_only
        .sort_by(|a, b| a.0.full_name.cmp(&b.0.full_name));
    plan.unchanged.sort();

    Ok(plan)
}

fn index_by_identity(existing: &[StoredItem]) -> Result<BTreeMap<&str, &StoredItem>, IndexError> {
    let mut index = BTreeMap::new();
    for stored in existing {
        if index.insert(stored.full_name.as_str(), stored).is_some() {
            return Err(IndexError::DuplicateIdentity {
                identity: stored.full_name.clone(),
            });
        }
    }
    Ok(index)
}
