use thiserror::Error;

use crate::repository::RepositoryError;

/// Errors raised while loading the existing records.
///
/// Any of these aborts the pass before a single write is attempted.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The backing store could not be read.
    #[error("Failed to load records: {0}")]
    Load(#[from] RepositoryError),

    /// Two stored records share an identity.
    #[error("Duplicate identity in record index: {identity}")]
    DuplicateIdentity { identity: String },

    /// Any other backend failure.
    #[error("Record index unavailable: {message}")]
    Unavailable { message: String },
}

impl IndexError {
    /// Create an unavailable error.
    #[inline]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Errors raised by a single create, update or archive.
///
/// A write error only fails the one identity it belongs to.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The backing store rejected the write.
    #[error("Write failed: {0}")]
    Store(#[from] RepositoryError),

    /// The record to update or archive does not exist.
    #[error("No record for {identity}")]
    Missing { identity: String },

    /// Any other backend failure.
    #[error("Write rejected: {message}")]
    Rejected { message: String },
}

impl WriteError {
    /// Create a rejected error.
    #[inline]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}
