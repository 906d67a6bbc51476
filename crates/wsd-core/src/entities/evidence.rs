use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EvidenceSource;

/// One processed chunk of evidence. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EvidenceRecord {
    pub id: String,
    pub session_id: String,
    /// Monotonic per session, starting at 1.
    pub sequence_index: i64,
    pub source: EvidenceSource,
    pub raw_text: String,
    pub processed_at: DateTime<Utc>,
}
