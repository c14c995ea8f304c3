use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use crate::entity::starred_repo::{Column, Entity as StarredRepo};
use crate::item::TrackedItem;

use super::convert::from_model;
use super::errors::Result;

// ─── Query Operations ────────────────────────────────────────────────────────

/// Load every stored repository, archived ones included, ordered by identity.
pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<TrackedItem>> {
    let models = StarredRepo::find()
        .order_by_asc(Column::FullName)
        .all(db)
        .await?;
    Ok(models.into_iter().map(from_model).collect())
}

/// Active repositories that still have no usable summary.
pub async fn find_missing_summary(db: &DatabaseConnection) -> Result<Vec<TrackedItem>> {
    let models = StarredRepo::find()
        .filter(Column::Archived.eq(false))
        .filter(
            Condition::any()
                .add(Column::Summary.is_null())
                .add(Column::Summary.eq("")),
        )
        .order_by_asc(Column::FullName)
        .all(db)
        .await?;
    Ok(models.into_iter().map(from_model).collect())
}

/// Count all stored repositories.
pub async fn count(db: &DatabaseConnection) -> Result<u64> {
    Ok(StarredRepo::find().count(db).await?)
}

/// Count archived (unstarred) repositories.
pub async fn count_archived(db: &DatabaseConnection) -> Result<u64> {
    Ok(StarredRepo::find()
        .filter(Column::Archived.eq(true))
        .count(db)
        .await?)
}

#[cfg(all(test, feature = "sqlite", feature = "migrate"))]
mod tests {
    use chrono::Utc;

    use crate::connect_and_migrate;
    use crate::item::SourceItem;
    use crate::repository::{mark_archived, upsert};

    use super::*;

    #[tokio::test]
    async fn counts_and_missing_summary() {
        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate");
        let now = Utc::now();

        let mut summarized = TrackedItem::from_source(&SourceItem::new("a", "one"), now);
        summarized.summary = Some("A summary".to_string());
        summarized.summary_generated_at = Some(now);
        let mut blank = TrackedItem::from_source(&SourceItem::new("b", "two"), now);
        blank.summary = Some(String::new());
        let bare = TrackedItem::from_source(&SourceItem::new("c", "three"), now);
        let gone = TrackedItem::from_source(&SourceItem::new("d", "four"), now);

        for item in [&summarized, &blank, &bare, &gone] {
            upsert(&db, item).await.expect("insert");
        }
        mark_archived(&db, "d/four", now).await.expect("archive");

        assert_eq!(count(&db).await.expect("count"), 4);
        assert_eq!(count_archived(&db).await.expect("count archived"), 1);

        let missing: Vec<String> = find_missing_summary(&db)
            .await
            .expect("query")
            .into_iter()
            .map(|i| i.full_name)
            .collect();
        assert_eq!(missing, vec!["b/two", "c/three"]);

        let all = find_all(&db).await.expect("find all");
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].full_name, "a/one");
    }
}
