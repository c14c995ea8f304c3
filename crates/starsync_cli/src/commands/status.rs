use console::style;
use starsync::{db, repository};

/// Counts shown by `starsync status`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct StoreStatus {
    pub total: u64,
    pub archived: u64,
    pub missing_summary: usize,
}

impl StoreStatus {
    pub(crate) fn lines(&self) -> Vec<String> {
        vec![
            format!("{:<18} {}", "Stored:", self.total),
            format!("{:<18} {}", "Active:", self.total.saturating_sub(self.archived)),
            format!("{:<18} {}", "Archived:", self.archived),
            format!("{:<18} {}", "Missing summary:", self.missing_summary),
        ]
    }
}

pub(crate) async fn load_status(
    db: &sea_orm::DatabaseConnection,
) -> Result<StoreStatus, repository::RepositoryError> {
    Ok(StoreStatus {
        total: repository::count(db).await?,
        archived: repository::count_archived(db).await?,
        missing_summary: repository::find_missing_summary(db).await?.len(),
    })
}

pub(crate) async fn handle_status(database_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect_and_migrate(database_url).await?;
    let status = load_status(&db).await?;

    println!("{}", style("Starred repositories").bold());
    for line in status.lines() {
        println!("  {}", line);
    }
    tracing::debug!(
        total = status.total,
        archived = status.archived,
        missing_summary = status.missing_summary,
        "Store status"
    );

    Ok(())
}
