use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::Set;

use crate::entity::starred_repo::{ActiveModel, Model};
use crate::item::{Descriptor, TrackedItem};

/// Convert a tracked item into an active model with every column set.
pub fn to_active_model(item: &TrackedItem) -> ActiveModel {
    let d = &item.descriptor;
    ActiveModel {
        full_name: Set(item.full_name.clone()),
        owner: Set(d.owner.clone()),
        name: Set(d.name.clone()),
        url: Set(d.url.clone()),
        description: Set(d.description.clone()),
        language: Set(d.language.clone()),
        topics: Set(serde_json::json!(d.topics)),
        stars: Set(i64::from(d.stars)),
        summary: Set(item.summary.clone()),
        summary_generated_at: Set(item.summary_generated_at.map(|t| t.fixed_offset())),
        summary_attempted_at: Set(item.summary_attempted_at.map(|t| t.fixed_offset())),
        created_at: Set(item.created_at.fixed_offset()),
        last_synced_at: Set(item.last_synced_at.fixed_offset()),
        archived: Set(item.archived),
    }
}

/// Convert a stored row back into a tracked item.
///
/// Non-string topic entries are dropped; a negative star count reads as zero.
pub fn from_model(model: Model) -> TrackedItem {
    let topics: BTreeSet<String> = model
        .topics
        .as_array()
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    TrackedItem {
        descriptor: Descriptor {
            owner: model.owner,
            name: model.name,
            url: model.url,
            description: model.description,
            language: model.language,
            topics,
            stars: u32::try_from(model.stars.max(0)).unwrap_or(u32::MAX),
        },
        full_name: model.full_name,
        summary: model.summary,
        summary_generated_at: model.summary_generated_at.map(|t| t.with_timezone(&Utc)),
        summary_attempted_at: model.summary_attempted_at.map(|t| t.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        last_synced_at: model.last_synced_at.with_timezone(&Utc),
        archived: model.archived,
    }
}
