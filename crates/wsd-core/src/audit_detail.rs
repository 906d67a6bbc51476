//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `detail` JSON blob. These types
//! give the common shapes a schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Detail for `AuditAction::ItemObtained` and `AuditAction::ItemReset`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
    pub reason: Option<String>,
    /// Evidence quote backing an obtain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    /// `incremental` or `reanalysis`.
    pub mode: String,
}

/// Detail for lock acquire/takeover/release entries.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LockDetail {
    pub holder_id: String,
    /// Previous holder when a lapsed lease was taken over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_holder: Option<String>,
    pub lease_duration_secs: i64,
}

/// Detail for `AuditAction::ChecklistGenerated`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ChecklistGeneratedDetail {
    pub items: u32,
    pub replaced: u32,
}
