//! Operator-triggered reanalysis over the whole evidence ledger.
//!
//! Never scheduled: it runs only when a lock holder asks for it. Unlike
//! incremental analysis it also accepts resets of items whose recorded
//! value was never concrete.

use std::sync::Arc;

use wsd_core::entities::{EvidenceRecord, LockToken};
use wsd_core::enums::{AnalysisMode, EvidenceSource, InterpreterStatus};
use wsd_core::responses::ReanalysisOutcome;
use wsd_db::error::{DatabaseError, LockError};
use wsd_db::repos::batch::{AnalysisBatch, ReanalysisSummary};
use wsd_interpreter::{InterpretationRequest, ObtainProposal, Proposal};

use crate::corpus::build_corpus;
use crate::error::EngineError;
use crate::plan::plan_transitions;
use crate::state_machine::{ChecklistStateMachine, item_views, session_context};

/// The source of the newest record containing the quote, else of the newest record.
fn source_for_quote(records: &[EvidenceRecord], obtain: &ObtainProposal) -> EvidenceSource {
    let newest = records.last().map_or(EvidenceSource::Manual, |r| r.source);
    obtain
        .quote
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .and_then(|quote| records.iter().rev().find(|r| r.raw_text.contains(quote)))
        .map_or(newest, |r| r.source)
}

pub struct ReanalysisCoordinator {
    machine: Arc<ChecklistStateMachine>,
}

impl ReanalysisCoordinator {
    /// Shares the state machine's store, interpreter and session queue.
    #[must_use]
    pub const fn new(machine: Arc<ChecklistStateMachine>) -> Self {
        Self { machine }
    }

    /// Re-evaluate every item against the bounded full corpus.
    ///
    /// A `ReanalysisRun` summary is persisted for every call, including an
    /// empty ledger (interpreter skipped) and interpreter failures.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Lock` with `NotHolder` unless `token` holds a
    /// live lease on `session_id`, or `EngineError::Database`.
    pub async fn reanalyze_all(
        &self,
        token: &LockToken,
        session_id: &str,
    ) -> Result<ReanalysisOutcome, EngineError> {
        if token.session_id != session_id {
            return Err(LockError::NotHolder {
                session_id: session_id.to_string(),
                holder_id: token.holder_id.clone(),
            }
            .into());
        }
        let store = self.machine.store();
        store.require_holder(token).await?;
        let _turn = self.machine.queue().enter(session_id).await;

        let items = store.list_items(session_id, None).await?;
        let records = store.list_evidence(session_id).await?;
        let corpus = build_corpus(&records, self.machine.settings().max_corpus_chars);
        if let Some(notice) = corpus.notice() {
            tracing::warn!(
                session_id,
                original_chars = notice.original_chars,
                retained_chars = notice.retained_chars,
                dropped_records = notice.dropped_records,
                "reanalysis corpus truncated"
            );
        }

        let (proposal, interpreter_status) = if records.is_empty() {
            tracing::info!(session_id, "empty evidence ledger, skipping interpreter");
            (Proposal::default(), InterpreterStatus::Skipped)
        } else {
            let (outstanding_items, obtained_items) = item_views(&items);
            let request = InterpretationRequest {
                session_id: session_id.to_string(),
                mode: AnalysisMode::Reanalysis,
                outstanding_items,
                obtained_items,
                evidence_text: corpus.text.clone(),
                prior_context: Vec::new(),
                session_context: Some(session_context(session_id, &items)),
            };
            self.machine.propose(&request).await
        };

        let plan = plan_transitions(&items, &proposal, AnalysisMode::Reanalysis, |obtain| {
            source_for_quote(&records, obtain)
        });

        let mut batch = AnalysisBatch::new(session_id, AnalysisMode::Reanalysis);
        batch.reanalysis = Some(ReanalysisSummary {
            evidence_records: corpus.records,
            corpus_chars: corpus.retained_chars,
            truncated: corpus.is_truncated(),
            interpreter_status,
            dropped_in_plan: plan.dropped_count(),
        });
        batch.obtains = plan.obtains;
        batch.resets = plan.resets;
        batch.findings = plan.findings;
        let report = store.apply_batch(&batch).await?;

        let mut dropped = plan.dropped;
        dropped.extend(report.stale);
        let run = report.run.ok_or(DatabaseError::NoResult)?;
        tracing::info!(
            session_id,
            run_id = %run.id,
            obtained = run.obtained,
            reset = run.reset,
            missing = run.missing,
            interpreter = %run.interpreter_status,
            "reanalysis completed"
        );

        Ok(ReanalysisOutcome {
            run,
            truncation: corpus.notice(),
            dropped,
        })
    }
}
