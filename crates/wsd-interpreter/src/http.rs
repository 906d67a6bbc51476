//! OpenAI-compatible chat-completions backend.
//!
//! Sends the request as JSON in the user message and asks for a response
//! constrained to the [`Proposal`] JSON schema.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wsd_config::InterpreterConfig;

use crate::error::InterpreterError;
use crate::parse::parse_proposal;
use crate::types::{InterpretationRequest, Proposal};
use crate::EvidenceInterpreter;

const SYSTEM_PROMPT: &str = "\
You maintain a workshop discovery checklist. You receive outstanding items, \
obtained items and new evidence text, and reply with JSON matching the schema.
Rules:
- Propose to_obtain only when the evidence states a specific, concrete value \
for an outstanding item. A mention, a question or a vague acknowledgment is not a value.
- Propose to_reset only when the evidence explicitly supersedes or contradicts \
the recorded value of an obtained item; give the reason. In reanalysis mode you \
may also reset an item whose recorded value was never concrete, with kind \
\"insufficiently_concrete\".
- prior_context is for reference only; do not re-evaluate it.
- Record risks and notable observations as findings.
When in doubt, propose nothing.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    schema: serde_json::Value,
    strict: bool,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct HttpInterpreter {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    schema: serde_json::Value,
}

impl HttpInterpreter {
    /// Build a client for `config.endpoint` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `InterpreterError::Http` if the reqwest client fails to build.
    pub fn new(config: &InterpreterConfig, timeout: Duration) -> Result<Self, InterpreterError> {
        let http = reqwest::Client::builder()
            .user_agent("wsd/0.1")
            .timeout(timeout)
            .build()?;
        let schema = serde_json::to_value(schemars::schema_for!(Proposal))
            .map_err(|e| InterpreterError::Malformed(format!("proposal schema: {e}")))?;
        Ok(Self {
            http,
            url: format!("{}/chat/completions", config.endpoint.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            schema,
        })
    }

    fn body<'a>(&'a self, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "checklist_proposal",
                    schema: self.schema.clone(),
                    strict: false,
                },
            },
            temperature: 0.0,
        }
    }
}

#[async_trait]
impl EvidenceInterpreter for HttpInterpreter {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn interpret(&self, request: &InterpretationRequest) -> Result<Proposal, InterpreterError> {
        let user = serde_json::to_string(request)
            .map_err(|e| InterpreterError::Malformed(format!("request encoding: {e}")))?;
        tracing::debug!(
            session_id = %request.session_id,
            mode = %request.mode,
            evidence_chars = request.evidence_text.len(),
            model = %self.model,
            "calling interpreter"
        );

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.body(&user))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InterpreterError::Timeout
                } else {
                    InterpreterError::Http(e)
                }
            })?;

        if !resp.status().is_success() {
            return Err(InterpreterError::Api {
                status: resp.status().as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        let data: ChatResponse = resp
            .json()
            .await
            .map_err(|e| InterpreterError::Malformed(format!("response body: {e}")))?;
        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| InterpreterError::Malformed("no message content".into()))?;
        parse_proposal(&content)
    }
}
