//! Evidence interpreter endpoint configuration.

use serde::{Deserialize, Serialize};

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterpreterConfig {
    /// Base URL of an OpenAI-compatible API (e.g., `https://api.openai.com/v1`).
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model: default_model(),
        }
    }
}

impl InterpreterConfig {
    /// Check if the interpreter has the minimum required fields for remote calls.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty() && !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = InterpreterConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn configured_when_endpoint_and_key_set() {
        let config = InterpreterConfig {
            endpoint: "https://api.openai.com/v1".into(),
            api_key: "sk-test".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }
}
