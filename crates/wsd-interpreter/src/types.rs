//! Request and proposal shapes exchanged with an interpreter.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use wsd_core::entities::{ChecklistItem, NewFinding};
use wsd_core::enums::{AnalysisMode, Confidence, Importance, ResetKind};

/// The slice of a checklist item an interpreter gets to see.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ItemView {
    pub item_id: String,
    pub item_number: i64,
    pub text: String,
    pub importance: Importance,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obtained_text: Option<String>,
}

impl From<&ChecklistItem> for ItemView {
    fn from(item: &ChecklistItem) -> Self {
        Self {
            item_id: item.id.clone(),
            item_number: item.item_number,
            text: item.text.clone(),
            importance: item.importance,
            category: item.category.clone(),
            obtained_text: item.obtained_text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InterpretationRequest {
    pub session_id: String,
    pub mode: AnalysisMode,
    pub outstanding_items: Vec<ItemView>,
    pub obtained_items: Vec<ItemView>,
    /// New evidence in incremental mode, the bounded corpus in reanalysis.
    pub evidence_text: String,
    /// Earlier evidence, for context only; never re-evaluated.
    #[serde(default)]
    pub prior_context: Vec<String>,
    #[serde(default)]
    pub session_context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ObtainProposal {
    pub item_id: String,
    /// The concrete value found in the evidence.
    pub obtained_text: String,
    pub confidence: Confidence,
    /// Verbatim excerpt supporting the value.
    #[serde(default)]
    pub quote: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResetProposal {
    pub item_id: String,
    pub reason: String,
    #[serde(default)]
    pub kind: ResetKind,
}

/// Everything an interpreter may propose for one call.
///
/// Only proposals; the engine decides what is applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Proposal {
    #[serde(default)]
    pub to_obtain: Vec<ObtainProposal>,
    #[serde(default)]
    pub to_reset: Vec<ResetProposal>,
    #[serde(default)]
    pub findings: Vec<NewFinding>,
}

impl Proposal {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_obtain.is_empty() && self.to_reset.is_empty() && self.findings.is_empty()
    }

    /// Append another proposal's entries to this one.
    pub fn merge(&mut self, other: Self) {
        self.to_obtain.extend(other.to_obtain);
        self.to_reset.extend(other.to_reset);
        self.findings.extend(other.findings);
    }
}
