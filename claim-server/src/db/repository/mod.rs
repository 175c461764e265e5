//! Repository Module
//!
//! CRUD and transition operations over the embedded SurrealDB tables.

pub mod claim;
pub mod profile;

// Re-exports
pub use claim::ClaimRepository;
pub use profile::ProfileRepository;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Conditional update matched nothing because the record is no
    /// longer in the expected state (lost a transition race, or the
    /// caller read stale data)
    #[error("Stale state: {0}")]
    StaleState(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // Unique index violations surface as duplicates, not 500s
        if msg.contains("already contains") || msg.contains("unique") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
