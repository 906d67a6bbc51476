use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Confidence, EvidenceSource, Importance, ItemStatus};
use crate::errors::CoreError;

/// One discovery requirement a session aims to collect.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ChecklistItem {
    pub id: String,
    pub session_id: String,
    /// Unique within the session and never changed after creation.
    pub item_number: i64,
    pub text: String,
    pub importance: Importance,
    pub category: String,
    pub suggested_question: Option<String>,
    pub status: ItemStatus,
    pub obtained_text: Option<String>,
    pub confidence: Option<Confidence>,
    pub obtained_source: Option<EvidenceSource>,
    pub obtained_at: Option<DateTime<Utc>>,
    /// Reason given by the most recent contradiction reset, cleared on the next obtain.
    pub reset_reason: Option<String>,
    pub reset_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChecklistItem {
    #[must_use]
    pub fn is_obtained(&self) -> bool {
        self.status == ItemStatus::Obtained
    }

    /// Verify the obtained fields are all-or-nothing together with `status`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InconsistentItem` when the fields disagree with the status.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        let present = [
            self.obtained_text.is_some(),
            self.confidence.is_some(),
            self.obtained_source.is_some(),
            self.obtained_at.is_some(),
        ];
        let consistent = match self.status {
            ItemStatus::Obtained => present.iter().all(|p| *p),
            ItemStatus::Missing => present.iter().all(|p| !p),
        };
        if consistent {
            Ok(())
        } else {
            Err(CoreError::InconsistentItem {
                item_id: self.id.clone(),
                status: self.status,
                present,
            })
        }
    }
}

/// Input for (re)generating a session checklist.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewChecklistItem {
    /// Explicit item number. When absent the position in the list is used.
    #[serde(default)]
    pub item_number: Option<i64>,
    pub text: String,
    pub importance: Importance,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub suggested_question: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_item() -> ChecklistItem {
        let now = Utc::now();
        ChecklistItem {
            id: "itm-00000001".into(),
            session_id: "ses-1".into(),
            item_number: 1,
            text: "Number of warehouses".into(),
            importance: Importance::Critical,
            category: "logistics".into(),
            suggested_question: None,
            status: ItemStatus::Missing,
            obtained_text: None,
            confidence: None,
            obtained_source: None,
            obtained_at: None,
            reset_reason: None,
            reset_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn missing_item_without_values_is_consistent() {
        assert!(missing_item().check_invariants().is_ok());
    }

    #[test]
    fn obtained_item_requires_every_field() {
        let mut item = missing_item();
        item.status = ItemStatus::Obtained;
        item.obtained_text = Some("3 warehouses".into());
        item.confidence = Some(Confidence::High);
        assert!(item.check_invariants().is_err());

        item.obtained_source = Some(EvidenceSource::Recording);
        item.obtained_at = Some(Utc::now());
        assert!(item.check_invariants().is_ok());
    }

    #[test]
    fn missing_item_with_leftover_value_is_rejected() {
        let mut item = missing_item();
        item.obtained_text = Some("stale".into());
        assert!(matches!(item.check_invariants(), Err(CoreError::InconsistentItem { status: ItemStatus::Missing, .. })));
    }
}
