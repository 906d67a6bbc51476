//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be read or did not match the config shape.
    #[error("failed to load configuration: {0}")]
    Figment(#[from] figment::Error),

    /// A value parsed but the engine cannot run with it.
    #[error("{key} is out of range: {reason}")]
    OutOfRange {
        key: &'static str,
        reason: &'static str,
    },
}
