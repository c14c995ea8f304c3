use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::item::{StoredItem, TrackedItem};
use crate::repository::{self, RepositoryError};

use super::errors::{IndexError, WriteError};
use super::types::{RecordIndex, RecordWriter};

/// Record index and writer backed by a SeaORM connection.
///
/// Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct DbStore {
    db: Arc<DatabaseConnection>,
}

impl DbStore {
    /// Wrap an established connection.
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Borrow the underlying connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn write_error(identity: &str, err: RepositoryError) -> WriteError {
    if err.is_not_found() {
        WriteError::Missing {
            identity: identity.to_string(),
        }
    } else {
        WriteError::Store(err)
    }
}

#[async_trait]
impl RecordIndex for DbStore {
    async fn load_records(&self) -> Result<Vec<StoredItem>, IndexError> {
        let records = repository::find_all(&self.db).await?;
        tracing::debug!(count = records.len(), "Loaded stored records");
        Ok(records)
    }
}

#[async_trait]
impl RecordWriter for DbStore {
    async fn create(&self, item: &TrackedItem) -> Result<(), WriteError> {
        repository::upsert(&self.db, item)
            .await
            .map_err(|e| write_error(&item.full_name, e))
    }

    async fn update(&self, item: &TrackedItem) -> Result<(), WriteError> {
        repository::update(&self.db, item)
            .await
            .map_err(|e| write_error(&item.full_name, e))
    }

    async fn archive(&self, identity: &str, at: DateTime<Utc>) -> Result<(), WriteError> {
        repository::mark_archived(&self.db, identity, at)
            .await
            .map_err(|e| write_error(identity, e))
    }
}
