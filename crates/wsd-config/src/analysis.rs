//! Analysis pipeline bounds.

use serde::{Deserialize, Serialize};

const fn default_max_corpus_chars() -> u64 {
    120_000
}

const fn default_context_records() -> u32 {
    3
}

const fn default_interpreter_timeout_secs() -> u64 {
    90
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Upper bound on the reanalysis corpus, in characters. Oldest content is trimmed first.
    #[serde(default = "default_max_corpus_chars")]
    pub max_corpus_chars: u64,

    /// How many earlier evidence records are passed as context to incremental analysis.
    #[serde(default = "default_context_records")]
    pub context_records: u32,

    /// Interpreter calls running longer than this are treated as proposing nothing.
    #[serde(default = "default_interpreter_timeout_secs")]
    pub interpreter_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_corpus_chars: default_max_corpus_chars(),
            context_records: default_context_records(),
            interpreter_timeout_secs: default_interpreter_timeout_secs(),
        }
    }
}
