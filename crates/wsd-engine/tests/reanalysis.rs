//! Operator-triggered reanalysis through `ReanalysisCoordinator`.

mod common;

use pretty_assertions::assert_eq;

use common::{SESSION, finding, harness, harness_with, obtain, obtaining, reset, resetting, settings};
use wsd_core::enums::{AnalysisMode, EvidenceSource, InterpreterStatus, ItemStatus, ResetKind};
use wsd_db::error::LockError;
use wsd_engine::{EngineError, EngineSettings};
use wsd_interpreter::{Proposal, ScriptRule, ScriptedFailure};

#[tokio::test]
async fn reanalysis_obtains_from_the_whole_corpus() {
    let h = harness(&["Number of warehouses", "Fleet size"]).await;
    let token = h.store().acquire_lock(SESSION, "facilitator-a").await.unwrap();
    h.interpreter.push_rule(
        ScriptRule::new(
            "14 trucks",
            obtaining(vec![obtain(h.item(1), "14 trucks", Some("fleet: 14 trucks"))]),
        )
        .in_mode(AnalysisMode::Reanalysis),
    );

    for (text, source) in [
        ("fleet: 14 trucks", EvidenceSource::Document),
        ("we also talked about pallets", EvidenceSource::Recording),
    ] {
        h.machine.submit_evidence(&token, text, source).await.unwrap();
    }
    assert_eq!(h.reload(1).await.status, ItemStatus::Missing);

    let outcome = h.coordinator.reanalyze_all(&token, SESSION).await.unwrap();

    assert_eq!(outcome.run.obtained, 1);
    assert_eq!(outcome.run.missing, 1);
    assert_eq!(outcome.run.evidence_records, 2);
    assert_eq!(outcome.run.interpreter_status, InterpreterStatus::Ok);
    assert!(outcome.truncation.is_none());
    // Attributed to the record holding the quote, not the newest one.
    assert_eq!(h.reload(1).await.obtained_source, Some(EvidenceSource::Document));

    let request = h.interpreter.requests().pop().unwrap();
    assert_eq!(request.mode, AnalysisMode::Reanalysis);
    assert!(request.evidence_text.contains("[#1]\nfleet: 14 trucks"));
    assert!(request.evidence_text.contains("[#2]\nwe also talked about pallets"));
    assert!(request.prior_context.is_empty());
}

#[tokio::test]
async fn reanalysis_may_reset_vague_values() {
    let h = harness(&["Number of warehouses"]).await;
    let token = h.store().acquire_lock(SESSION, "facilitator-a").await.unwrap();
    h.interpreter.push_rule(
        ScriptRule::new("a few", obtaining(vec![obtain(h.item(0), "a few warehouses", None)]))
            .in_mode(AnalysisMode::Incremental),
    );
    h.interpreter.push_rule(
        ScriptRule::new(
            "a few",
            resetting(vec![reset(
                h.item(0),
                "'a few' is not a count",
                ResetKind::InsufficientlyConcrete,
            )]),
        )
        .in_mode(AnalysisMode::Reanalysis),
    );

    h.machine
        .submit_evidence(&token, "we have a few warehouses", EvidenceSource::Recording)
        .await
        .unwrap();
    assert_eq!(h.reload(0).await.status, ItemStatus::Obtained);

    let outcome = h.coordinator.reanalyze_all(&token, SESSION).await.unwrap();

    assert_eq!(outcome.run.reset, 1);
    assert_eq!(outcome.run.missing, 1);
    let item = h.reload(0).await;
    assert_eq!(item.status, ItemStatus::Missing);
    assert_eq!(item.reset_reason.as_deref(), Some("'a few' is not a count"));
}

#[tokio::test]
async fn empty_ledger_skips_the_interpreter_but_records_a_run() {
    let h = harness(&["Number of warehouses"]).await;
    let token = h.store().acquire_lock(SESSION, "facilitator-a").await.unwrap();

    let outcome = h.coordinator.reanalyze_all(&token, SESSION).await.unwrap();

    assert_eq!(h.interpreter.calls(), 0);
    assert_eq!(outcome.run.interpreter_status, InterpreterStatus::Skipped);
    assert_eq!(outcome.run.evidence_records, 0);
    assert_eq!(outcome.run.missing, 1);
    let runs = h.store().list_reanalysis_runs(SESSION, 10).await.unwrap();
    assert_eq!(runs, vec![outcome.run]);
}

#[tokio::test]
async fn oversized_corpus_is_truncated_from_the_oldest_end() {
    let settings = EngineSettings {
        max_corpus_chars: 60,
        ..settings()
    };
    let h = harness_with(&["Number of warehouses"], settings, 120).await;
    let token = h.store().acquire_lock(SESSION, "facilitator-a").await.unwrap();
    for text in [
        "the oldest chunk, long enough to be dropped entirely",
        "a middle chunk that mentions pallets",
        "newest: 3 warehouses",
    ] {
        h.machine
            .submit_evidence(&token, text, EvidenceSource::Recording)
            .await
            .unwrap();
    }

    let outcome = h.coordinator.reanalyze_all(&token, SESSION).await.unwrap();

    let notice = outcome.truncation.unwrap();
    assert!(notice.original_chars > 60);
    assert!(notice.retained_chars <= 60);
    assert!(notice.dropped_records >= 1);
    assert!(outcome.run.truncated);
    assert_eq!(outcome.run.corpus_chars, notice.retained_chars);

    let request = h.interpreter.requests().pop().unwrap();
    assert!(request.evidence_text.chars().count() <= 60);
    assert!(request.evidence_text.ends_with("newest: 3 warehouses"));
    assert!(!request.evidence_text.contains("oldest"));
}

#[tokio::test]
async fn interpreter_failure_still_persists_the_run() {
    let h = harness(&["Number of warehouses"]).await;
    let token = h.store().acquire_lock(SESSION, "facilitator-a").await.unwrap();
    h.machine
        .submit_evidence(&token, "some chunk", EvidenceSource::Recording)
        .await
        .unwrap();
    h.interpreter.fail_with(Some(ScriptedFailure::Unavailable));

    let outcome = h.coordinator.reanalyze_all(&token, SESSION).await.unwrap();

    assert_eq!(outcome.run.interpreter_status, InterpreterStatus::Unavailable);
    assert_eq!(outcome.run.obtained, 0);
    assert_eq!(
        h.store().get_reanalysis_run(&outcome.run.id).await.unwrap(),
        outcome.run
    );
}

#[tokio::test]
async fn reanalysis_findings_carry_the_run_id() {
    let h = harness(&["Number of warehouses"]).await;
    let token = h.store().acquire_lock(SESSION, "facilitator-a").await.unwrap();
    h.interpreter.push_rule(
        ScriptRule::new(
            "Excel",
            Proposal {
                findings: vec![finding("Legacy ERP")],
                ..Proposal::default()
            },
        )
        .in_mode(AnalysisMode::Reanalysis),
    );
    h.machine
        .submit_evidence(&token, "we export to Excel", EvidenceSource::Recording)
        .await
        .unwrap();

    let outcome = h.coordinator.reanalyze_all(&token, SESSION).await.unwrap();

    assert_eq!(outcome.run.findings_recorded, 1);
    let findings = h.store().list_findings(SESSION, 10).await.unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].reanalysis_id.as_deref(), Some(outcome.run.id.as_str()));
    assert_eq!(findings[0].evidence_id, None);
}

#[tokio::test]
async fn reanalysis_requires_a_live_lease_on_that_session() {
    let h = harness_with(&["Number of warehouses"], settings(), 2).await;
    let token = h.store().acquire_lock(SESSION, "facilitator-a").await.unwrap();

    let err = h
        .coordinator
        .reanalyze_all(&token, "ses-other")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Lock(LockError::NotHolder { .. })));

    h.clock.advance(chrono::Duration::seconds(3));
    let err = h.coordinator.reanalyze_all(&token, SESSION).await.unwrap_err();
    assert!(matches!(err, EngineError::Lock(LockError::NotHolder { .. })));

    assert!(h.store().list_reanalysis_runs(SESSION, 10).await.unwrap().is_empty());
    assert_eq!(h.interpreter.calls(), 0);
}
