//! Metadata store error types.

use thiserror::Error;

/// Metadata store operation errors.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for metadata operations.
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

/// Translate a driver error into a domain error.
///
/// Unique-index violations become [`MetadataError::Constraint`] carrying
/// `conflict`, classified structurally via the driver's error kind rather
/// than by matching message text.
pub(crate) fn classify_db_error(err: sqlx::Error, conflict: &str) -> MetadataError {
    if let sqlx::Error::Database(ref db_err) = err {
        if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return MetadataError::Constraint(conflict.to_string());
        }
    }
    MetadataError::Database(err)
}
