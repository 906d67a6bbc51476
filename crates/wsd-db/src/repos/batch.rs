//! All-or-nothing application of one analysis step.
//!
//! An incremental batch records its evidence, applies the validated
//! transitions as conditional writes and appends findings tagged with the
//! evidence ID. A reanalysis batch records no evidence and instead persists
//! a `ReanalysisRun` summary. Either way everything commits together.

use chrono::{DateTime, Utc};

use wsd_core::entities::{EvidenceRecord, Finding, NewFinding, ReanalysisRun};
use wsd_core::enums::{
    AnalysisMode, AuditAction, Confidence, EntityType, EvidenceSource, InterpreterStatus,
    ItemStatus,
};
use wsd_core::ids::PREFIX_REANALYSIS;
use wsd_core::responses::{DropReason, DroppedProposal, ProposalKind};

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::to_detail;
use crate::repos::audit::record_audit;
use crate::repos::checklist::{ObtainWrite, count_by_status, obtain_if_missing, reset_if_obtained};
use crate::repos::evidence::insert_evidence;
use crate::repos::finding::{FindingOrigin, insert_finding};
use crate::repos::reanalysis::insert_run;
use crate::service::{WsdService, finish};

/// Evidence to append as part of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvidence {
    pub raw_text: String,
    pub source: EvidenceSource,
}

/// A validated `missing -> obtained` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedObtain {
    pub item_id: String,
    pub obtained_text: String,
    pub confidence: Confidence,
    pub source: EvidenceSource,
    pub quote: Option<String>,
}

/// A validated `obtained -> missing` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedReset {
    pub item_id: String,
    pub reason: String,
}

/// Corpus facts of a reanalysis pass, completed into a `ReanalysisRun`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReanalysisSummary {
    pub evidence_records: u32,
    pub corpus_chars: u64,
    pub truncated: bool,
    pub interpreter_status: InterpreterStatus,
    /// Proposals rejected before the batch was built.
    pub dropped_in_plan: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisBatch {
    pub session_id: String,
    pub mode: AnalysisMode,
    pub evidence: Option<NewEvidence>,
    pub obtains: Vec<PlannedObtain>,
    pub resets: Vec<PlannedReset>,
    pub findings: Vec<NewFinding>,
    pub reanalysis: Option<ReanalysisSummary>,
}

impl AnalysisBatch {
    /// An empty batch for `session_id` in `mode`.
    #[must_use]
    pub fn new(session_id: impl Into<String>, mode: AnalysisMode) -> Self {
        Self {
            session_id: session_id.into(),
            mode,
            evidence: None,
            obtains: Vec::new(),
            resets: Vec::new(),
            findings: Vec::new(),
            reanalysis: None,
        }
    }
}

/// What the batch actually changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub evidence: Option<EvidenceRecord>,
    /// IDs of items moved to `obtained`.
    pub obtained: Vec<String>,
    /// IDs of items moved back to `missing`.
    pub reset: Vec<String>,
    /// Transitions whose conditional write matched no row.
    pub stale: Vec<DroppedProposal>,
    pub findings: Vec<Finding>,
    pub remaining_missing: u32,
    pub run: Option<ReanalysisRun>,
}

async fn apply_in(
    conn: &libsql::Connection,
    batch: &AnalysisBatch,
    now: DateTime<Utc>,
) -> Result<BatchReport, DatabaseError> {
    let session_id = batch.session_id.as_str();

    let evidence = match &batch.evidence {
        Some(new) => Some(insert_evidence(conn, session_id, &new.raw_text, new.source, now).await?),
        None => None,
    };
    let reanalysis_id = match batch.reanalysis {
        Some(_) => Some(generate_id(conn, PREFIX_REANALYSIS).await?),
        None => None,
    };

    let mut obtained = Vec::new();
    let mut reset = Vec::new();
    let mut stale = Vec::new();

    for planned in &batch.obtains {
        let write = ObtainWrite {
            item_id: &planned.item_id,
            obtained_text: &planned.obtained_text,
            confidence: planned.confidence,
            source: planned.source,
            quote: planned.quote.as_deref(),
        };
        if obtain_if_missing(conn, session_id, &write, batch.mode, now).await? {
            obtained.push(planned.item_id.clone());
        } else {
            stale.push(DroppedProposal {
                item_id: planned.item_id.clone(),
                kind: ProposalKind::Obtain,
                reason: DropReason::Stale,
            });
        }
    }

    for planned in &batch.resets {
        if reset_if_obtained(conn, session_id, &planned.item_id, &planned.reason, batch.mode, now)
            .await?
        {
            reset.push(planned.item_id.clone());
        } else {
            stale.push(DroppedProposal {
                item_id: planned.item_id.clone(),
                kind: ProposalKind::Reset,
                reason: DropReason::Stale,
            });
        }
    }

    let origin = FindingOrigin {
        evidence_id: evidence.as_ref().map(|e| e.id.as_str()),
        reanalysis_id: reanalysis_id.as_deref(),
    };
    let mut findings = Vec::with_capacity(batch.findings.len());
    for new in &batch.findings {
        findings.push(insert_finding(conn, session_id, origin, new, now).await?);
    }

    let remaining_missing = count_by_status(conn, session_id, ItemStatus::Missing).await?;

    let run = match (&batch.reanalysis, reanalysis_id) {
        (Some(summary), Some(id)) => {
            let stale_count = u32::try_from(stale.len()).unwrap_or(u32::MAX);
            let run = ReanalysisRun {
                id,
                session_id: session_id.to_string(),
                obtained: u32::try_from(obtained.len()).unwrap_or(u32::MAX),
                reset: u32::try_from(reset.len()).unwrap_or(u32::MAX),
                missing: remaining_missing,
                findings_recorded: u32::try_from(findings.len()).unwrap_or(u32::MAX),
                dropped: summary.dropped_in_plan.saturating_add(stale_count),
                evidence_records: summary.evidence_records,
                corpus_chars: summary.corpus_chars,
                truncated: summary.truncated,
                interpreter_status: summary.interpreter_status,
                created_at: now,
            };
            insert_run(conn, &run).await?;
            record_audit(
                conn,
                session_id,
                EntityType::Reanalysis,
                &run.id,
                AuditAction::ReanalysisCompleted,
                Some(to_detail(&run)?),
                now,
            )
            .await?;
            Some(run)
        }
        _ => None,
    };

    Ok(BatchReport {
        evidence,
        obtained,
        reset,
        stale,
        findings,
        remaining_missing,
        run,
    })
}

impl WsdService {
    /// Apply one analysis step in a single transaction.
    ///
    /// Lost conditional writes are reported in `BatchReport::stale`; any SQL
    /// error rolls back everything, including the evidence record.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails.
    pub async fn apply_batch(&self, batch: &AnalysisBatch) -> Result<BatchReport, DatabaseError> {
        let now = self.clock().now();
        let _gate = self.gate().await;
        let tx = self.db().conn().transaction().await?;
        let result = apply_in(&tx, batch, now).await;
        let report = finish(tx, result).await?;

        tracing::info!(
            session_id = %batch.session_id,
            mode = %batch.mode,
            obtained = report.obtained.len(),
            reset = report.reset.len(),
            findings = report.findings.len(),
            remaining_missing = report.remaining_missing,
            "analysis batch applied"
        );
        if !report.stale.is_empty() {
            tracing::warn!(
                session_id = %batch.session_id,
                stale = report.stale.len(),
                "conditional writes lost to a concurrent change"
            );
        }
        Ok(report)
    }
}
