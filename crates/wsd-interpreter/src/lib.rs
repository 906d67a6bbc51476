//! # wsd-interpreter
//!
//! The evidence interpreter boundary. An interpreter reads checklist items
//! and evidence text and *proposes* transitions; it never touches the store.
//!
//! Backends:
//! - [`HttpInterpreter`]: OpenAI-compatible chat completions.
//! - [`ScriptedInterpreter`]: deterministic substring rules, for tests and dry runs.
//! - [`NullInterpreter`]: always unavailable.
//!
//! Every backend must honour the same conservatism contract: obtain only
//! on a specific, concrete value; reset only when new evidence explicitly
//! supersedes the recorded one.

pub mod error;
pub mod http;
pub mod null;
pub mod parse;
pub mod scripted;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wsd_config::InterpreterConfig;

pub use error::InterpreterError;
pub use http::HttpInterpreter;
pub use null::NullInterpreter;
pub use parse::parse_proposal;
pub use scripted::{ScriptRule, ScriptedFailure, ScriptedInterpreter};
pub use types::{InterpretationRequest, ItemView, ObtainProposal, Proposal, ResetProposal};

#[async_trait]
pub trait EvidenceInterpreter: Send + Sync {
    /// Backend identifier used in logs (e.g., `"http"`, `"scripted"`).
    fn name(&self) -> &'static str;

    /// Propose transitions for `request`.
    async fn interpret(&self, request: &InterpretationRequest) -> Result<Proposal, InterpreterError>;
}

/// Build the backend described by `config`: HTTP when an endpoint and key
/// are configured, the null backend otherwise.
///
/// # Errors
///
/// Returns `InterpreterError::Http` if the HTTP client cannot be built.
pub fn from_config(
    config: &InterpreterConfig,
    timeout: Duration,
) -> Result<Arc<dyn EvidenceInterpreter>, InterpreterError> {
    if config.is_configured() {
        Ok(Arc::new(HttpInterpreter::new(config, timeout)?))
    } else {
        tracing::debug!("no interpreter endpoint configured, using null backend");
        Ok(Arc::new(NullInterpreter))
    }
}
