//! StarredRepo entity - one row per repository the user has ever starred.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// StarredRepo model - the persisted sync target for a starred repository.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "starred_repositories")]
pub struct Model {
    /// Full name (`owner/name`), the sync identity.
    #[sea_orm(primary_key, auto_increment = false)]
    pub full_name: String,

    // ─── Naming ──────────────────────────────────────────────────────────────
    /// Owner login (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Canonical web URL.
    #[sea_orm(column_type = "Text")]
    pub url: String,

    // ─── Content ─────────────────────────────────────────────────────────────
    /// Repository description (empty when unset).
    #[sea_orm(column_type = "Text", default_value = "")]
    pub description: String,
    /// Primary programming language.
    pub language: Option<String>,
    /// Repository topics (stored as a sorted JSON array).
    #[sea_orm(column_type = "Json")]
    pub topics: serde_json::Value,
    /// Star count at the last sync.
    #[sea_orm(default_value = 0)]
    pub stars: i64,

    // ─── Enrichment ──────────────────────────────────────────────────────────
    /// AI-generated summary.
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    /// When the current summary was generated.
    pub summary_generated_at: Option<DateTimeWithTimeZone>,
    /// When the summarizer last completed a call for this repository.
    pub summary_attempted_at: Option<DateTimeWithTimeZone>,

    // ─── Tracking ────────────────────────────────────────────────────────────
    /// When the record was first written.
    pub created_at: DateTimeWithTimeZone,
    /// When the record was last written.
    pub last_synced_at: DateTimeWithTimeZone,
    /// Whether the repository has been unstarred.
    #[sea_orm(default_value = false)]
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
