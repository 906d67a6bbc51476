//! Validation of an interpreter proposal against the current item set.
//!
//! Pure: no I/O, no clock. The result is what the batch will attempt;
//! the conditional writes may still lose to a concurrent change.

use std::collections::{HashMap, HashSet};

use wsd_core::entities::{ChecklistItem, NewFinding};
use wsd_core::enums::{AnalysisMode, EvidenceSource, ItemStatus};
use wsd_core::responses::{DropReason, DroppedProposal, ProposalKind};
use wsd_db::repos::batch::{PlannedObtain, PlannedReset};
use wsd_interpreter::{ObtainProposal, Proposal};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub obtains: Vec<PlannedObtain>,
    pub resets: Vec<PlannedReset>,
    pub findings: Vec<NewFinding>,
    pub dropped: Vec<DroppedProposal>,
}

impl Plan {
    #[must_use]
    pub fn dropped_count(&self) -> u32 {
        u32::try_from(self.dropped.len()).unwrap_or(u32::MAX)
    }

    fn reject(&mut self, item_id: &str, kind: ProposalKind, reason: DropReason) {
        self.dropped.push(DroppedProposal {
            item_id: item_id.to_string(),
            kind,
            reason,
        });
    }
}

/// Keep only the proposals that are legal transitions from the current state.
///
/// An item may be targeted once per proposal; the first occurrence wins.
/// Obtains are considered before resets. `source_for` picks the evidence
/// source recorded on each accepted obtain.
pub fn plan_transitions(
    items: &[ChecklistItem],
    proposal: &Proposal,
    mode: AnalysisMode,
    source_for: impl Fn(&ObtainProposal) -> EvidenceSource,
) -> Plan {
    let by_id: HashMap<&str, &ChecklistItem> =
        items.iter().map(|item| (item.id.as_str(), item)).collect();
    let mut targeted: HashSet<&str> = HashSet::new();
    let mut plan = Plan::default();

    for obtain in &proposal.to_obtain {
        let id = obtain.item_id.as_str();
        let Some(item) = by_id.get(id) else {
            plan.reject(id, ProposalKind::Obtain, DropReason::UnknownItem);
            continue;
        };
        if !targeted.insert(id) {
            plan.reject(id, ProposalKind::Obtain, DropReason::DuplicateTarget);
            continue;
        }
        if !item.status.can_transition_to(ItemStatus::Obtained) {
            plan.reject(id, ProposalKind::Obtain, DropReason::WrongPriorState);
            continue;
        }
        let value = obtain.obtained_text.trim();
        if value.is_empty() {
            plan.reject(id, ProposalKind::Obtain, DropReason::BlankValue);
            continue;
        }
        plan.obtains.push(PlannedObtain {
            item_id: item.id.clone(),
            obtained_text: value.to_string(),
            confidence: obtain.confidence,
            source: source_for(obtain),
            quote: obtain
                .quote
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(String::from),
        });
    }

    for reset in &proposal.to_reset {
        let id = reset.item_id.as_str();
        let Some(item) = by_id.get(id) else {
            plan.reject(id, ProposalKind::Reset, DropReason::UnknownItem);
            continue;
        };
        if !targeted.insert(id) {
            plan.reject(id, ProposalKind::Reset, DropReason::DuplicateTarget);
            continue;
        }
        if !item.status.can_transition_to(ItemStatus::Missing) {
            plan.reject(id, ProposalKind::Reset, DropReason::WrongPriorState);
            continue;
        }
        let reason = reset.reason.trim();
        if reason.is_empty() {
            plan.reject(id, ProposalKind::Reset, DropReason::BlankReason);
            continue;
        }
        if !mode.accepts_reset(reset.kind) {
            plan.reject(id, ProposalKind::Reset, DropReason::ResetKindNotAllowed);
            continue;
        }
        plan.resets.push(PlannedReset {
            item_id: item.id.clone(),
            reason: reason.to_string(),
        });
    }

    plan.findings = proposal
        .findings
        .iter()
        .filter(|f| !f.topic.trim().is_empty() && !f.details.trim().is_empty())
        .cloned()
        .collect();

    plan
}
