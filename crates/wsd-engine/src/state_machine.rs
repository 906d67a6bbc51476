//! Incremental analysis of newly submitted evidence.

use std::sync::Arc;

use wsd_core::entities::{ChecklistItem, LockToken};
use wsd_core::enums::{AnalysisMode, EvidenceSource, InterpreterStatus};
use wsd_core::responses::{AnalysisOutcome, DroppedProposal};
use wsd_db::error::DatabaseError;
use wsd_db::repos::batch::{AnalysisBatch, NewEvidence};
use wsd_db::service::WsdService;
use wsd_interpreter::{EvidenceInterpreter, InterpretationRequest, ItemView, Proposal};

use crate::EngineSettings;
use crate::error::EngineError;
use crate::plan::plan_transitions;
use crate::queue::SessionQueue;

pub struct ChecklistStateMachine {
    store: Arc<WsdService>,
    interpreter: Arc<dyn EvidenceInterpreter>,
    queue: SessionQueue,
    settings: EngineSettings,
}

/// Split a session's items into (outstanding, obtained) views.
pub(crate) fn item_views(items: &[ChecklistItem]) -> (Vec<ItemView>, Vec<ItemView>) {
    let (obtained, outstanding): (Vec<&ChecklistItem>, Vec<&ChecklistItem>) =
        items.iter().partition(|item| item.is_obtained());
    (
        outstanding.into_iter().map(ItemView::from).collect(),
        obtained.into_iter().map(ItemView::from).collect(),
    )
}

pub(crate) fn session_context(session_id: &str, items: &[ChecklistItem]) -> String {
    let obtained = items.iter().filter(|item| item.is_obtained()).count();
    format!(
        "Session {session_id}: {obtained} of {} checklist items obtained.",
        items.len()
    )
}

pub(crate) fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl ChecklistStateMachine {
    #[must_use]
    pub fn new(
        store: Arc<WsdService>,
        interpreter: Arc<dyn EvidenceInterpreter>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            interpreter,
            queue: SessionQueue::new(),
            settings,
        }
    }

    #[must_use]
    pub fn store(&self) -> &WsdService {
        &self.store
    }

    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub(crate) const fn queue(&self) -> &SessionQueue {
        &self.queue
    }

    /// Call the interpreter under the configured deadline.
    ///
    /// Any failure becomes an empty proposal plus the matching status.
    pub(crate) async fn propose(
        &self,
        request: &InterpretationRequest,
    ) -> (Proposal, InterpreterStatus) {
        let call = self.interpreter.interpret(request);
        match tokio::time::timeout(self.settings.interpreter_timeout, call).await {
            Ok(Ok(proposal)) => (proposal, InterpreterStatus::Ok),
            Ok(Err(e)) => {
                tracing::warn!(
                    session_id = %request.session_id,
                    interpreter = self.interpreter.name(),
                    mode = %request.mode,
                    %e,
                    "interpreter failed, proposing nothing"
                );
                (Proposal::default(), e.status())
            }
            Err(_) => {
                tracing::warn!(
                    session_id = %request.session_id,
                    interpreter = self.interpreter.name(),
                    timeout_secs = self.settings.interpreter_timeout.as_secs_f64(),
                    "interpreter timed out, proposing nothing"
                );
                (Proposal::default(), InterpreterStatus::TimedOut)
            }
        }
    }

    /// Record `evidence_text` and apply whatever it legitimately changes.
    ///
    /// The evidence is recorded even when the interpreter fails, so a later
    /// reanalysis can reconsider it. Chunks of one session are processed in
    /// submission order.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::EmptyEvidence` for blank text, or
    /// `EngineError::Database` if the store fails.
    pub async fn analyze_incremental(
        &self,
        session_id: &str,
        evidence_text: &str,
        source: EvidenceSource,
    ) -> Result<AnalysisOutcome, EngineError> {
        if evidence_text.trim().is_empty() {
            return Err(EngineError::EmptyEvidence);
        }
        let _turn = self.queue.enter(session_id).await;

        let items = self.store.list_items(session_id, None).await?;
        let prior = self
            .store
            .recent_evidence(session_id, self.settings.context_records)
            .await?;
        let (outstanding_items, obtained_items) = item_views(&items);
        let request = InterpretationRequest {
            session_id: session_id.to_string(),
            mode: AnalysisMode::Incremental,
            outstanding_items,
            obtained_items,
            evidence_text: evidence_text.to_string(),
            prior_context: prior.into_iter().map(|r| r.raw_text).collect(),
            session_context: Some(session_context(session_id, &items)),
        };

        let (proposal, interpreter) = self.propose(&request).await;
        let plan = plan_transitions(&items, &proposal, AnalysisMode::Incremental, |_| source);
        for dropped in &plan.dropped {
            tracing::debug!(session_id, item_id = %dropped.item_id, reason = %dropped.reason, "proposal dropped");
        }

        let mut batch = AnalysisBatch::new(session_id, AnalysisMode::Incremental);
        batch.evidence = Some(NewEvidence {
            raw_text: evidence_text.to_string(),
            source,
        });
        batch.obtains = plan.obtains;
        batch.resets = plan.resets;
        batch.findings = plan.findings;
        let report = self.store.apply_batch(&batch).await?;

        let mut dropped: Vec<DroppedProposal> = plan.dropped;
        dropped.extend(report.stale);
        if !dropped.is_empty() {
            tracing::warn!(session_id, dropped = dropped.len(), "proposals not applied");
        }

        Ok(AnalysisOutcome {
            evidence: report.evidence.ok_or(DatabaseError::NoResult)?,
            newly_obtained: count(report.obtained.len()),
            reset: count(report.reset.len()),
            remaining_missing: report.remaining_missing,
            findings_recorded: count(report.findings.len()),
            dropped,
            interpreter,
        })
    }

    /// Collaborator entry point: check the lease, then analyze.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::EmptyEvidence` before any state change,
    /// `EngineError::Lock` with `NotHolder` if the token's lease is gone.
    pub async fn submit_evidence(
        &self,
        token: &LockToken,
        evidence_text: &str,
        source: EvidenceSource,
    ) -> Result<AnalysisOutcome, EngineError> {
        if evidence_text.trim().is_empty() {
            return Err(EngineError::EmptyEvidence);
        }
        self.store.require_holder(token).await?;
        self.analyze_incremental(&token.session_id, evidence_text, source)
            .await
    }
}
