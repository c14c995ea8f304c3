use console::style;
use starsync::db;
use starsync::migration::{
    MIGRATION_TABLE, Migrator, MigratorTrait, SchemaVersion, schema_versions,
};

use super::status::load_status;
use crate::MigrateAction;

fn version_lines(versions: &[SchemaVersion]) -> Vec<String> {
    versions
        .iter()
        .map(|version| {
            let state = if version.applied { "applied" } else { "pending" };
            format!("{:<8} {}", state, version.name)
        })
        .collect()
}

fn pending(versions: &[SchemaVersion]) -> Vec<&str> {
    versions
        .iter()
        .filter(|v| !v.applied)
        .map(|v| v.name.as_str())
        .collect()
}

/// The migration `down` would revert: the newest applied one.
fn rollback_target(versions: &[SchemaVersion]) -> Option<&str> {
    versions
        .iter()
        .rev()
        .find(|v| v.applied)
        .map(|v| v.name.as_str())
}

async fn print_store_counts(
    db: &sea_orm::DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    for line in load_status(db).await?.lines() {
        println!("  {}", line);
    }
    Ok(())
}

pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;
    let versions = schema_versions(&db).await?;

    match action {
        MigrateAction::Up => {
            let pending = pending(&versions);
            if pending.is_empty() {
                println!("Schema is up to date.");
            } else {
                Migrator::up(&db, None).await?;
                for name in &pending {
                    println!("  {} {}", style("applied").green(), name);
                }
                tracing::info!(applied = pending.len(), "Applied migrations");
            }
            print_store_counts(&db).await?;
        }
        MigrateAction::Down => match rollback_target(&versions) {
            Some(name) => {
                Migrator::down(&db, Some(1)).await?;
                println!("  {} {}", style("reverted").yellow(), name);
                tracing::info!(migration = name, "Rolled back migration");
            }
            None => println!("No applied migrations to roll back."),
        },
        MigrateAction::Status => {
            println!("{} ({})", style("Schema migrations").bold(), MIGRATION_TABLE);
            for line in version_lines(&versions) {
                println!("  {}", line);
            }
        }
        MigrateAction::Fresh => {
            if rollback_target(&versions).is_some() {
                let dropped = load_status(&db).await?.total;
                println!(
                    "{} dropping {} stored repositories",
                    style("warning:").yellow().bold(),
                    dropped
                );
            }
            Migrator::fresh(&db).await?;
            println!("Schema recreated.");
            print_store_counts(&db).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(states: &[(&str, bool)]) -> Vec<SchemaVersion> {
        states
            .iter()
            .map(|(name, applied)| SchemaVersion {
                name: name.to_string(),
                applied: *applied,
            })
            .collect()
    }

    #[test]
    fn test_version_lines_show_state() {
        let lines = version_lines(&versions(&[("m1_create", true), ("m2_index", false)]));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("applied"));
        assert!(lines[0].ends_with("m1_create"));
        assert!(lines[1].starts_with("pending"));
    }

    #[test]
    fn test_pending_and_rollback_target() {
        let all = versions(&[("m1_create", true), ("m2_index", true), ("m3_extra", false)]);
        assert_eq!(pending(&all), vec!["m3_extra"]);
        assert_eq!(rollback_target(&all), Some("m2_index"));

        let fresh = versions(&[("m1_create", false)]);
        assert_eq!(rollback_target(&fresh), None);
    }

    #[tokio::test]
    async fn test_up_applies_pending_migrations() {
        let db = db::connect("sqlite::memory:").await.expect("in-memory db");
        let before = schema_versions(&db).await.expect("versions");
        assert_eq!(pending(&before).len(), 1);

        Migrator::up(&db, None).await.expect("up");
        let after = schema_versions(&db).await.expect("versions");
        assert!(pending(&after).is_empty());
        assert_eq!(load_status(&db).await.expect("status").total, 0);
    }
}
