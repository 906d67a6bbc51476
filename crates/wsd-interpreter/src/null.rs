//! Backend used when no interpreter is configured.

use async_trait::async_trait;

use crate::error::InterpreterError;
use crate::types::{InterpretationRequest, Proposal};
use crate::EvidenceInterpreter;

/// Always `Unavailable`. Evidence submitted through it is still recorded
/// and can be picked up by a later reanalysis.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInterpreter;

#[async_trait]
impl EvidenceInterpreter for NullInterpreter {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn interpret(&self, _request: &InterpretationRequest) -> Result<Proposal, InterpreterError> {
        Err(InterpreterError::Unavailable("no interpreter configured".into()))
    }
}
