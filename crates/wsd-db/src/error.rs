//! Database error types for wsd-db.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB, bad input for a write).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from the session access lock.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another collaborator holds a live lease on the session.
    #[error("session {session_id} is in use by {holder_id} until {expires_at}")]
    Conflict {
        session_id: String,
        holder_id: String,
        expires_at: DateTime<Utc>,
    },

    /// The caller does not hold a valid lease on the session.
    #[error("{holder_id} does not hold the lock on session {session_id}")]
    NotHolder {
        session_id: String,
        holder_id: String,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<libsql::Error> for LockError {
    fn from(e: libsql::Error) -> Self {
        Self::Database(DatabaseError::LibSql(e))
    }
}
