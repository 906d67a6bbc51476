//! Status enums, entity types, and actions for workshop discovery.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`,
//! which is also the representation stored in SQL. `ItemStatus` carries the
//! checklist state machine via `allowed_next_states()`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

/// How strongly the evidence supports an obtained value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Importance
// ---------------------------------------------------------------------------

/// Priority of a checklist item for the engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Critical,
    Important,
    #[serde(alias = "nice-to-have")]
    NiceToHave,
}

impl Importance {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Important => "important",
            Self::NiceToHave => "nice_to_have",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ItemStatus
// ---------------------------------------------------------------------------

/// Status of a checklist item.
///
/// ```text
/// missing → obtained   (evidence confirms a concrete value)
/// obtained → missing   (later evidence contradicts the recorded value)
/// ```
///
/// There is no terminal state: an item may oscillate as long as every
/// transition is backed by evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Missing,
    Obtained,
}

impl ItemStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Missing => &[Self::Obtained],
            Self::Obtained => &[Self::Missing],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Obtained => "obtained",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EvidenceSource
// ---------------------------------------------------------------------------

/// Channel an evidence chunk arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    /// Transcribed recording segment.
    Recording,
    /// Text extracted from an uploaded document.
    Document,
    /// Notes typed in by a collaborator.
    Manual,
}

impl EvidenceSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recording => "recording",
            Self::Document => "document",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RiskLevel
// ---------------------------------------------------------------------------

/// Risk attached to an out-of-scope finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ResetKind
// ---------------------------------------------------------------------------

/// Why an obtained item is being sent back to `missing`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResetKind {
    /// Newer evidence explicitly supersedes the recorded value.
    #[default]
    Contradicted,
    /// The recorded value was never concrete enough. Only honoured during reanalysis.
    InsufficientlyConcrete,
}

impl ResetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contradicted => "contradicted",
            Self::InsufficientlyConcrete => "insufficiently_concrete",
        }
    }
}

impl fmt::Display for ResetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AnalysisMode
// ---------------------------------------------------------------------------

/// Which pass is asking the interpreter for transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Newest evidence chunk against outstanding items.
    Incremental,
    /// Full evidence corpus against every item.
    Reanalysis,
}

impl AnalysisMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incremental => "incremental",
            Self::Reanalysis => "reanalysis",
        }
    }

    /// Whether a reset of the given kind may be applied in this mode.
    #[must_use]
    pub const fn accepts_reset(self, kind: ResetKind) -> bool {
        match (self, kind) {
            (_, ResetKind::Contradicted) | (Self::Reanalysis, ResetKind::InsufficientlyConcrete) => {
                true
            }
            (Self::Incremental, ResetKind::InsufficientlyConcrete) => false,
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InterpreterStatus
// ---------------------------------------------------------------------------

/// Outcome of one interpreter invocation as seen by the engine.
///
/// Every non-`Ok` status means "no transitions proposed"; the evidence is
/// still recorded so a later reanalysis can reconsider it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InterpreterStatus {
    Ok,
    Unavailable,
    Malformed,
    TimedOut,
    /// No interpreter call was made (e.g. empty evidence ledger).
    Skipped,
}

impl InterpreterStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Unavailable => "unavailable",
            Self::Malformed => "malformed",
            Self::TimedOut => "timed_out",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for InterpreterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ChecklistGenerated,
    ItemObtained,
    ItemReset,
    EvidenceRecorded,
    FindingRecorded,
    FindingDeleted,
    LockAcquired,
    LockTakenOver,
    LockReleased,
    ReanalysisCompleted,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChecklistGenerated => "checklist_generated",
            Self::ItemObtained => "item_obtained",
            Self::ItemReset => "item_reset",
            Self::EvidenceRecorded => "evidence_recorded",
            Self::FindingRecorded => "finding_recorded",
            Self::FindingDeleted => "finding_deleted",
            Self::LockAcquired => "lock_acquired",
            Self::LockTakenOver => "lock_taken_over",
            Self::LockReleased => "lock_released",
            Self::ReanalysisCompleted => "reanalysis_completed",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Kind of entity an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Checklist,
    ChecklistItem,
    Evidence,
    Finding,
    SessionLock,
    Reanalysis,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checklist => "checklist",
            Self::ChecklistItem => "checklist_item",
            Self::Evidence => "evidence",
            Self::Finding => "finding",
            Self::SessionLock => "session_lock",
            Self::Reanalysis => "reanalysis",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
