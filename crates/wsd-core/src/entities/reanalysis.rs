use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::InterpreterStatus;

/// Persisted summary of one full-corpus reanalysis pass.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReanalysisRun {
    pub id: String,
    pub session_id: String,
    pub obtained: u32,
    pub reset: u32,
    /// Items still missing after the pass.
    pub missing: u32,
    pub findings_recorded: u32,
    pub dropped: u32,
    pub evidence_records: u32,
    pub corpus_chars: u64,
    pub truncated: bool,
    pub interpreter_status: InterpreterStatus,
    pub created_at: DateTime<Utc>,
}
