use sea_orm::DbErr;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Record not found.
    #[error("Repository not found: {full_name}")]
    NotFound { full_name: String },

    /// Invalid input data.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl RepositoryError {
    /// Create a NotFound error for an identity lookup.
    pub fn not_found(full_name: impl Into<String>) -> Self {
        Self::NotFound {
            full_name: full_name.into(),
        }
    }

    /// Check if the error is a missing-record error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
