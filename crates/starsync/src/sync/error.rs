use thiserror::Error;

use crate::platform::FetchError;
use crate::store::IndexError;

/// Failures that abort a whole pass before anything is written.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The star snapshot could not be fetched.
    #[error("could not fetch starred repositories: {0}")]
    Fetch(#[from] FetchError),

    /// The stored records could not be loaded or are inconsistent.
    #[error("could not load existing records: {0}")]
    Index(#[from] IndexError),
}
