//! Engine error types.

use thiserror::Error;
use wsd_db::error::{DatabaseError, LockError};

/// Errors surfaced by analysis calls.
///
/// Interpreter failures are not errors here: they are recorded as an
/// `InterpreterStatus` on the outcome.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Evidence text is empty or whitespace.
    #[error("evidence text is empty")]
    EmptyEvidence,
}
