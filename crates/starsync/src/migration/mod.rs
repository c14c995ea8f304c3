//! Database migrations for the starsync schema.
//!
//! This module is only available when the `migrate` feature is enabled.

pub use sea_orm_migration::prelude::*;

use ::sea_orm::DatabaseConnection;
use sea_orm_migration::MigrationStatus;

mod m20260301_000001_create_schema;

/// Table that records which migrations have been applied.
pub const MIGRATION_TABLE: &str = "starsync_migrations";

/// The migrator that runs all migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260301_000001_create_schema::Migration)]
    }

    fn migration_table_name() -> SeaRc<dyn Iden> {
        SeaRc::new(Alias::new(MIGRATION_TABLE))
    }
}

/// One known migration and whether the database has it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaVersion {
    pub name: String,
    pub applied: bool,
}

/// List every known migration in order, with its applied state.
///
/// Creates the migrations table if it does not exist yet.
pub async fn schema_versions(db: &DatabaseConnection) -> Result<Vec<SchemaVersion>, DbErr> {
    let versions = Migrator::get_migration_with_status(db)
        .await?
        .iter()
        .map(|migration| SchemaVersion {
            name: migration.name().to_string(),
            applied: matches!(migration.status(), MigrationStatus::Applied),
        })
        .collect();
    Ok(versions)
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_versions_track_up_and_down() {
        let db = crate::db::connect("sqlite::memory:")
            .await
            .expect("in-memory db");

        let before = schema_versions(&db).await.expect("versions");
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].name, "m20260301_000001_create_schema");
        assert!(!before[0].applied);

        Migrator::up(&db, None).await.expect("up");
        assert!(schema_versions(&db).await.expect("versions")[0].applied);

        Migrator::down(&db, Some(1)).await.expect("down");
        assert!(!schema_versions(&db).await.expect("versions")[0].applied);
    }
}
