//! Response types returned by the engine and rendered as JSON by `wsd`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::{EvidenceRecord, ReanalysisRun};
use crate::enums::InterpreterStatus;

/// Why a proposed transition was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The item ID does not belong to the session.
    UnknownItem,
    /// The item was not in the prior state the transition requires.
    WrongPriorState,
    /// The same item was already targeted earlier in the proposal.
    DuplicateTarget,
    /// An obtain without a concrete value.
    BlankValue,
    /// A reset without a reason.
    BlankReason,
    /// A reset kind this analysis mode does not honour.
    ResetKindNotAllowed,
    /// The conditional write found the item already moved by a concurrent batch.
    Stale,
}

impl DropReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownItem => "unknown_item",
            Self::WrongPriorState => "wrong_prior_state",
            Self::DuplicateTarget => "duplicate_target",
            Self::BlankValue => "blank_value",
            Self::BlankReason => "blank_reason",
            Self::ResetKindNotAllowed => "reset_kind_not_allowed",
            Self::Stale => "stale",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of transition a dropped proposal asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    Obtain,
    Reset,
}

/// A proposal that validation or the conditional write rejected.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DroppedProposal {
    pub item_id: String,
    pub kind: ProposalKind,
    pub reason: DropReason,
}

/// Result of one incremental analysis call.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub evidence: EvidenceRecord,
    pub newly_obtained: u32,
    pub reset: u32,
    pub remaining_missing: u32,
    pub findings_recorded: u32,
    pub dropped: Vec<DroppedProposal>,
    pub interpreter: InterpreterStatus,
}

/// Reported when the reanalysis corpus exceeded its bound.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TruncationNotice {
    pub original_chars: u64,
    pub retained_chars: u64,
    /// Whole records left out, oldest first.
    pub dropped_records: u32,
}

/// Result of one full-corpus reanalysis pass.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReanalysisOutcome {
    pub run: ReanalysisRun,
    pub truncation: Option<TruncationNotice>,
    pub dropped: Vec<DroppedProposal>,
}
