use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RiskLevel;

/// Information relevant to the engagement but outside the checklist.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Finding {
    pub id: String,
    pub session_id: String,
    /// Evidence record whose analysis produced this finding.
    pub evidence_id: Option<String>,
    /// Reanalysis run that produced this finding.
    pub reanalysis_id: Option<String>,
    pub topic: String,
    pub finding_type: String,
    pub risk_level: RiskLevel,
    pub details: String,
    pub recommendation: Option<String>,
    pub source_quote: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Finding payload before it is assigned an ID and provenance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewFinding {
    pub topic: String,
    pub finding_type: String,
    pub risk_level: RiskLevel,
    pub details: String,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub source_quote: Option<String>,
}
