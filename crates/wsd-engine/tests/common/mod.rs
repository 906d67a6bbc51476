//! Shared harness for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use wsd_config::LockConfig;
use wsd_core::clock::ManualClock;
use wsd_core::entities::{ChecklistItem, NewChecklistItem, NewFinding};
use wsd_core::enums::{Confidence, Importance, ResetKind, RiskLevel};
use wsd_db::WsdDb;
use wsd_db::service::WsdService;
use wsd_engine::{ChecklistStateMachine, EngineSettings, ReanalysisCoordinator};
use wsd_interpreter::{ObtainProposal, Proposal, ResetProposal, ScriptedInterpreter};

pub const SESSION: &str = "ses-workshop-7";

pub struct Harness {
    pub clock: ManualClock,
    pub interpreter: Arc<ScriptedInterpreter>,
    pub machine: Arc<ChecklistStateMachine>,
    pub coordinator: ReanalysisCoordinator,
    pub items: Vec<ChecklistItem>,
}

impl Harness {
    pub fn store(&self) -> &WsdService {
        self.machine.store()
    }

    pub fn item(&self, n: usize) -> &ChecklistItem {
        &self.items[n]
    }

    pub async fn reload(&self, n: usize) -> ChecklistItem {
        self.store().get_item(&self.items[n].id).await.unwrap()
    }
}

pub fn settings() -> EngineSettings {
    EngineSettings {
        context_records: 3,
        max_corpus_chars: 120_000,
        interpreter_timeout: Duration::from_secs(5),
    }
}

pub async fn harness(texts: &[&str]) -> Harness {
    harness_with(texts, settings(), 120).await
}

pub async fn harness_with(texts: &[&str], settings: EngineSettings, lease_secs: u32) -> Harness {
    let clock = ManualClock::default();
    let db = WsdDb::open_local(":memory:").await.unwrap();
    let lock = LockConfig {
        lease_duration_secs: lease_secs,
    };
    let store = Arc::new(WsdService::from_db(db, Arc::new(clock.clone()), &lock));

    let new_items: Vec<NewChecklistItem> = texts
        .iter()
        .map(|t| NewChecklistItem {
            item_number: None,
            text: (*t).to_string(),
            importance: Importance::Critical,
            category: "logistics".into(),
            suggested_question: None,
        })
        .collect();
    let items = store.replace_checklist(SESSION, &new_items).await.unwrap();

    let interpreter = Arc::new(ScriptedInterpreter::new());
    let machine = Arc::new(ChecklistStateMachine::new(
        store,
        interpreter.clone(),
        settings,
    ));
    let coordinator = ReanalysisCoordinator::new(machine.clone());
    Harness {
        clock,
        interpreter,
        machine,
        coordinator,
        items,
    }
}

pub fn obtain(item: &ChecklistItem, value: &str, quote: Option<&str>) -> ObtainProposal {
    ObtainProposal {
        item_id: item.id.clone(),
        obtained_text: value.into(),
        confidence: Confidence::High,
        quote: quote.map(String::from),
    }
}

pub fn reset(item: &ChecklistItem, reason: &str, kind: ResetKind) -> ResetProposal {
    ResetProposal {
        item_id: item.id.clone(),
        reason: reason.into(),
        kind,
    }
}

pub fn obtaining(obtains: Vec<ObtainProposal>) -> Proposal {
    Proposal {
        to_obtain: obtains,
        ..Proposal::default()
    }
}

pub fn resetting(resets: Vec<ResetProposal>) -> Proposal {
    Proposal {
        to_reset: resets,
        ..Proposal::default()
    }
}

pub fn finding(topic: &str) -> NewFinding {
    NewFinding {
        topic: topic.into(),
        finding_type: "integration_risk".into(),
        risk_level: RiskLevel::High,
        details: "Inventory reconciled by hand every night".into(),
        recommendation: Some("Scope a data migration workstream".into()),
        source_quote: None,
    }
}
