use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entity::starred_repo::{Column, Entity as StarredRepo};
use crate::item::TrackedItem;

use super::convert::{from_model, to_active_model};
use super::errors::{RepositoryError, Result};

// ─── Single Record Operations ────────────────────────────────────────────────

/// Columns overwritten when an insert hits an existing identity.
///
/// `created_at` is deliberately absent so the first write time survives.
const UPSERT_COLUMNS: [Column; 12] = [
    Column::Owner,
    Column::Name,
    Column::Url,
    Column::Description,
    Column::Language,
    Column::Topics,
    Column::Stars,
    Column::Summary,
    Column::SummaryGeneratedAt,
    Column::SummaryAttemptedAt,
    Column::LastSyncedAt,
    Column::Archived,
];

pub(super) fn build_upsert_on_conflict() -> OnConflict {
    OnConflict::column(Column::FullName)
        .update_columns(UPSERT_COLUMNS)
        .to_owned()
}

/// Insert a repository, or overwrite it if the identity already exists.
///
/// Running it twice with the same item leaves one row with the same content.
pub async fn upsert(db: &DatabaseConnection, item: &TrackedItem) -> Result<()> {
    StarredRepo::insert(to_active_model(item))
        .on_conflict(build_upsert_on_conflict())
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Overwrite an existing repository.
///
/// # Errors
/// Returns `RepositoryError::NotFound` if no row has the item's identity.
pub async fn update(db: &DatabaseConnection, item: &TrackedItem) -> Result<()> {
    let mut model = to_active_model(item);
    // Keep the original first-write time.
    model.created_at = sea_orm::ActiveValue::NotSet;

    let result = StarredRepo::update_many()
        .set(model)
        .filter(Column::FullName.eq(item.full_name.as_str()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(RepositoryError::not_found(&item.full_name));
    }
    Ok(())
}

/// Flag a repository as archived.
///
/// Archiving an already archived row is a no-op that still succeeds.
pub async fn mark_archived(
    db: &DatabaseConnection,
    full_name: &str,
    at: DateTime<Utc>,
) -> Result<()> {
    let result = StarredRepo::update_many()
        .col_expr(Column::Archived, Expr::value(true))
        .col_expr(Column::LastSyncedAt, Expr::value(at.fixed_offset()))
        .filter(Column::FullName.eq(full_name))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(RepositoryError::not_found(full_name));
    }
    Ok(())
}

/// Find a repository by its identity.
pub async fn find_by_identity(
    db: &DatabaseConnection,
    full_name: &str,
) -> Result<Option<TrackedItem>> {
    let model = StarredRepo::find_by_id(full_name.to_string()).one(db).await?;
    Ok(model.map(from_model))
}
