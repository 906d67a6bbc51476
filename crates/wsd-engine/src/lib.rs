//! # wsd-engine
//!
//! The checklist consistency engine. Each analysis step is split into:
//!
//! 1. **propose**: ask the injected [`EvidenceInterpreter`] what changed;
//! 2. **validate**: [`plan::plan_transitions`], a pure filter against the
//!    current item states;
//! 3. **apply**: one all-or-nothing batch of conditional writes.
//!
//! [`ChecklistStateMachine`] handles incremental evidence and
//! [`ReanalysisCoordinator`] the operator-triggered full-corpus pass.

pub mod corpus;
pub mod error;
pub mod plan;
pub mod queue;
pub mod reanalysis;
pub mod state_machine;

use std::time::Duration;

use wsd_config::AnalysisConfig;

pub use error::EngineError;
pub use reanalysis::ReanalysisCoordinator;
pub use state_machine::ChecklistStateMachine;
pub use wsd_interpreter::EvidenceInterpreter;

/// Analysis knobs taken from `[analysis]` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Earlier evidence records passed to the interpreter as context.
    pub context_records: u32,
    pub max_corpus_chars: u64,
    pub interpreter_timeout: Duration,
}

impl From<&AnalysisConfig> for EngineSettings {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            context_records: config.context_records,
            max_corpus_chars: config.max_corpus_chars,
            interpreter_timeout: Duration::from_secs(config.interpreter_timeout_secs),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}
