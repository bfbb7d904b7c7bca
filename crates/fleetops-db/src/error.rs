use anyhow::anyhow;
use fleetops_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("protected: {0}")]
    Protected(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Map a unique violation to [`StoreError::Conflict`], anything else to `Database`.
    pub(crate) fn unique_or(err: sqlx::Error, message: impl Into<String>) -> Self {
        match err.as_database_error() {
            Some(db) if db.is_unique_violation() => StoreError::Conflict(message.into()),
            _ => StoreError::Database(err),
        }
    }

    /// Map a foreign key violation to [`StoreError::NotFound`], anything else to `Database`.
    pub(crate) fn foreign_key_or(err: sqlx::Error, message: impl Into<String>) -> Self {
        match err.as_database_error() {
            Some(db) if db.is_foreign_key_violation() => StoreError::NotFound(message.into()),
            _ => StoreError::Database(err),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::not_found(anyhow!(msg)),
            StoreError::Conflict(msg) | StoreError::Protected(msg) => {
                AppError::conflict(anyhow!(msg))
            }
            StoreError::Forbidden(msg) => AppError::forbidden(msg),
            StoreError::Invalid(msg) => AppError::bad_request(anyhow!(msg)),
            StoreError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                AppError::internal_error("Database error".to_string())
            }
        }
    }
}
