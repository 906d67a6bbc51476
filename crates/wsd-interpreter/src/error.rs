//! Interpreter error types.

use thiserror::Error;
use wsd_core::enums::InterpreterStatus;

/// Errors from an evidence interpreter call.
///
/// None of these are fatal: the engine records the evidence anyway and
/// treats the call as proposing nothing.
#[derive(Debug, Error)]
pub enum InterpreterError {
    /// No backend is configured or the backend refused to serve.
    #[error("interpreter unavailable: {0}")]
    Unavailable(String),

    /// The call exceeded its deadline.
    #[error("interpreter timed out")]
    Timeout,

    /// The backend answered with output that is not a valid proposal.
    #[error("malformed interpreter output: {0}")]
    Malformed(String),

    /// The backend returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl InterpreterError {
    /// Outcome recorded for this failure.
    #[must_use]
    pub const fn status(&self) -> InterpreterStatus {
        match self {
            Self::Unavailable(_) | Self::Api { .. } | Self::Http(_) => InterpreterStatus::Unavailable,
            Self::Timeout => InterpreterStatus::TimedOut,
            Self::Malformed(_) => InterpreterStatus::Malformed,
        }
    }
}
