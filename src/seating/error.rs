//! Seating domain errors

use crate::db::repository::RepoError;
use thiserror::Error;

/// Errors surfaced by the seating operations
#[derive(Debug, Error)]
pub enum SeatingError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Inconsistent state: {0}")]
    Inconsistent(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<RepoError> for SeatingError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => SeatingError::NotFound(msg),
            RepoError::Duplicate(msg) | RepoError::Validation(msg) => {
                SeatingError::Validation(msg)
            }
            RepoError::Database(msg) => SeatingError::Database(msg),
        }
    }
}

/// Result type for seating operations
pub type SeatingResult<T> = Result<T, SeatingError>;
