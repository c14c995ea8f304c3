//! Persistence operations for starred repository records.
//!
//! These functions work on [`TrackedItem`](crate::item::TrackedItem) values and
//! hide the SeaORM entity behind a conversion layer.

mod convert;
mod errors;
mod query;
mod single;

pub use convert::{from_model, to_active_model};
pub use errors::{RepositoryError, Result};
pub use query::{count, count_archived, find_all, find_missing_summary};
pub use single::{find_by_identity, mark_archived, update, upsert};

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbErr, EntityTrait, QueryTrait};

    use crate::entity::starred_repo::Entity as StarredRepo;
    use crate::item::{SourceItem, TrackedItem};

    #[test]
    fn test_repository_error_not_found() {
        let err = RepositoryError::not_found("octocat/hello");
        let msg = err.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("octocat/hello"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_repository_error_database_from_db_err() {
        let db_err = DbErr::RecordNotFound("test".to_string());
        let repo_err: RepositoryError = db_err.into();
        assert!(repo_err.to_string().contains("Database error"));
        assert!(!repo_err.is_not_found());
    }

    #[test]
    fn test_upsert_query_builds() {
        let item = TrackedItem::from_source(&SourceItem::new("o", "n"), chrono::Utc::now());
        let sql = StarredRepo::insert(to_active_model(&item))
            .on_conflict(single::build_upsert_on_conflict())
            .build(sea_orm::DatabaseBackend::Sqlite)
            .to_string();

        assert!(sql.contains("ON CONFLICT (\"full_name\")"), "{}", sql);
        assert!(sql.contains("DO UPDATE"), "{}", sql);
        assert!(sql.contains("\"summary\" = \"excluded\".\"summary\""), "{}", sql);
        assert!(
            !sql.contains("\"created_at\" = \"excluded\""),
            "created_at must not be overwritten: {}",
            sql
        );
    }
}
