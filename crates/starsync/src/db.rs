//! Database connection utilities.

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

/// Pragmas applied to every file-backed SQLite connection.
///
/// Summaries are written from several tasks at once, so readers must not
/// block writers and a briefly held lock should be waited out, not reported.
const SQLITE_PRAGMAS: [&str; 3] = [
    "PRAGMA journal_mode=WAL",
    "PRAGMA busy_timeout=5000",
    "PRAGMA synchronous=NORMAL",
];

async fn configure_sqlite(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    for pragma in SQLITE_PRAGMAS {
        db.execute(Statement::from_string(backend, pragma.to_string()))
            .await?;
    }
    Ok(())
}

/// Establish a connection to the database.
///
/// For `sqlite://` URLs this also enables WAL journaling, a 5 second busy
/// timeout and `synchronous=NORMAL`.
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    if database_url.starts_with("sqlite://") {
        configure_sqlite(&db).await?;
    }

    tracing::debug!(url = %redact(database_url), "Connected to database");
    Ok(db)
}

/// Establish a connection to the database and run all pending migrations.
///
/// # Example
/// ```ignore
/// let db = starsync::connect_and_migrate("sqlite://stars.db?mode=rwc").await?;
/// ```
#[cfg(feature = "migrate")]
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    use sea_orm_migration::MigratorTrait;

    let db = connect(database_url).await?;
    crate::migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Strip credentials from a connection URL before it reaches the logs.
fn redact(database_url: &str) -> String {
    match (database_url.find("://"), database_url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &database_url[..scheme_end], &database_url[at..])
        }
        _ => database_url.to_string(),
    }
}
