use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::item::{StoredItem, TrackedItem};

use super::errors::{IndexError, WriteError};

/// Read side of the sync target: the full set of previously written records.
#[async_trait]
pub trait RecordIndex: Send + Sync {
    /// Load every stored record, archived ones included.
    ///
    /// An empty vector means the store is genuinely empty. Failures must be
    /// reported as errors so they are never mistaken for "everything was
    /// unstarred".
    async fn load_records(&self) -> Result<Vec<StoredItem>, IndexError>;
}

/// Write side of the sync target.
///
/// Every operation is keyed by identity and must be safe to repeat: a create
/// for an identity that already exists overwrites it, and archiving an
/// archived record succeeds.
#[async_trait]
pub trait RecordWriter: Send + Sync {
    /// Write a record for an identity seen for the first time.
    async fn create(&self, item: &TrackedItem) -> Result<(), WriteError>;

    /// Overwrite an existing record with a new target state.
    async fn update(&self, item: &TrackedItem) -> Result<(), WriteError>;

    /// Flag a record as archived.
    async fn archive(&self, identity: &str, at: DateTime<Utc>) -> Result<(), WriteError>;
}
