//! Repository Module
//!
//! CRUD operations over the SQLite pool.

// Pricing
pub mod bundle_rule;

// Catalog
pub mod catalog;

// Re-exports
pub use bundle_rule::BundleRuleRepository;
pub use catalog::CatalogRepository;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Stored row can't be decoded (bad JSON column, bad decimal, ...)
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".to_string()),
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) | RepoError::Corrupt(msg) => {
                tracing::error!(error = %msg, "Repository error");
                AppError::database(msg)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Encode an ID list for a JSON TEXT column
pub(crate) fn encode_ids(ids: &[i64]) -> RepoResult<String> {
    serde_json::to_string(ids).map_err(|e| RepoError::Database(e.to_string()))
}

/// Decode a JSON TEXT column holding an ID list
pub(crate) fn decode_ids(raw: &str, column: &str) -> RepoResult<Vec<i64>> {
    serde_json::from_str(raw).map_err(|e| RepoError::Corrupt(format!("{column}: {e}")))
}
