//! Deterministic rule-table backend.
//!
//! Each rule fires when its needle occurs in the evidence text; the
//! proposals of all firing rules are merged in rule order. Used as the
//! test double for the engine and for dry runs without a model.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use wsd_core::enums::AnalysisMode;

use crate::error::InterpreterError;
use crate::types::{InterpretationRequest, Proposal};
use crate::EvidenceInterpreter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRule {
    pub needle: String,
    /// Restrict the rule to one analysis mode.
    pub mode: Option<AnalysisMode>,
    pub proposal: Proposal,
}

impl ScriptRule {
    #[must_use]
    pub fn new(needle: impl Into<String>, proposal: Proposal) -> Self {
        Self {
            needle: needle.into(),
            mode: None,
            proposal,
        }
    }

    #[must_use]
    pub const fn in_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = Some(mode);
        self
    }

    fn matches(&self, request: &InterpretationRequest) -> bool {
        self.mode.is_none_or(|mode| mode == request.mode)
            && request.evidence_text.contains(&self.needle)
    }
}

/// A scripted failure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    Unavailable,
    Malformed,
    /// Sleep this long, then answer from the rules as usual.
    Delay(Duration),
}

#[derive(Debug, Default)]
pub struct ScriptedInterpreter {
    rules: Mutex<Vec<ScriptRule>>,
    failure: Mutex<Option<ScriptedFailure>>,
    requests: Mutex<Vec<InterpretationRequest>>,
}

impl ScriptedInterpreter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rules(rules: Vec<ScriptRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
            ..Self::default()
        }
    }

    pub fn push_rule(&self, rule: ScriptRule) {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(rule);
    }

    /// Make every following call fail (or stop failing with `None`).
    pub fn fail_with(&self, failure: Option<ScriptedFailure>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = failure;
    }

    /// Number of `interpret` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Every request received, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<InterpretationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl EvidenceInterpreter for ScriptedInterpreter {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn interpret(&self, request: &InterpretationRequest) -> Result<Proposal, InterpreterError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let failure = *self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        match failure {
            Some(ScriptedFailure::Unavailable) => {
                return Err(InterpreterError::Unavailable("scripted outage".into()));
            }
            Some(ScriptedFailure::Malformed) => {
                return Err(InterpreterError::Malformed("scripted garbage".into()));
            }
            Some(ScriptedFailure::Delay(duration)) => tokio::time::sleep(duration).await,
            None => {}
        }

        let rules = self
            .rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let mut proposal = Proposal::default();
        for rule in rules.into_iter().filter(|r| r.matches(request)) {
            proposal.merge(rule.proposal);
        }
        Ok(proposal)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wsd_core::enums::{Confidence, ResetKind};

    use super::*;
    use crate::types::{ObtainProposal, ResetProposal};

    fn request(mode: AnalysisMode, text: &str) -> InterpretationRequest {
        InterpretationRequest {
            session_id: "ses-1".into(),
            mode,
            outstanding_items: Vec::new(),
            obtained_items: Vec::new(),
            evidence_text: text.into(),
            prior_context: Vec::new(),
            session_context: None,
        }
    }

    fn obtain(item_id: &str, value: &str) -> Proposal {
        Proposal {
            to_obtain: vec![ObtainProposal {
                item_id: item_id.into(),
                obtained_text: value.into(),
                confidence: Confidence::High,
                quote: None,
            }],
            ..Proposal::default()
        }
    }

    #[tokio::test]
    async fn merges_every_matching_rule() {
        let interpreter = ScriptedInterpreter::with_rules(vec![
            ScriptRule::new("warehouses", obtain("itm-1", "3 warehouses")),
            ScriptRule::new("trucks", obtain("itm-2", "14 trucks")),
            ScriptRule::new("pallets", obtain("itm-3", "unused")),
        ]);
        let proposal = interpreter
            .interpret(&request(AnalysisMode::Incremental, "3 warehouses and 14 trucks"))
            .await
            .unwrap();
        let ids: Vec<&str> = proposal.to_obtain.iter().map(|o| o.item_id.as_str()).collect();
        assert_eq!(ids, vec!["itm-1", "itm-2"]);
        assert_eq!(interpreter.calls(), 1);
    }

    #[tokio::test]
    async fn mode_restricted_rule_only_fires_in_its_mode() {
        let vague = Proposal {
            to_reset: vec![ResetProposal {
                item_id: "itm-1".into(),
                reason: "only 'a few' warehouses".into(),
                kind: ResetKind::InsufficientlyConcrete,
            }],
            ..Proposal::default()
        };
        let interpreter = ScriptedInterpreter::new();
        interpreter.push_rule(ScriptRule::new("a few", vague).in_mode(AnalysisMode::Reanalysis));

        let incremental = interpreter
            .interpret(&request(AnalysisMode::Incremental, "a few warehouses"))
            .await
            .unwrap();
        assert!(incremental.is_empty());

        let reanalysis = interpreter
            .interpret(&request(AnalysisMode::Reanalysis, "a few warehouses"))
            .await
            .unwrap();
        assert_eq!(reanalysis.to_reset.len(), 1);
    }

    #[tokio::test]
    async fn scripted_failures_surface_as_errors() {
        let interpreter = ScriptedInterpreter::new();
        interpreter.fail_with(Some(ScriptedFailure::Malformed));
        let err = interpreter
            .interpret(&request(AnalysisMode::Incremental, "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, InterpreterError::Malformed(_)));

        interpreter.fail_with(None);
        assert!(interpreter
            .interpret(&request(AnalysisMode::Incremental, "x"))
            .await
            .is_ok());
        assert_eq!(interpreter.requests().len(), 2);
    }
}
