//! LLM chat capability.
//!
//! The engine consumes a single `chat(messages) → text` capability. Both
//! the standardized patient and the report synthesizer are uses of this one
//! collaborator; only their prompts and failure handling differ.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM connection failed: {0}")]
    Connection(String),

    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("LLM returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("LLM response parsing error: {0}")]
    ResponseParsing(String),

    #[error("no model available")]
    NoModel,

    #[error("mock exhausted its scripted responses")]
    ScriptExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Chat completion abstraction (allows mocking).
pub trait ChatModel {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// Preferred local models in order of preference.
const PREFERRED_MODELS: &[&str] = &["medgemma", "llama3", "qwen3", "gemma3"];

/// Ollama HTTP client for local LLM inference.
pub struct OllamaChatClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaChatClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default Ollama instance at localhost:11434 with 5-minute timeout.
    pub fn default_local(model: &str) -> Self {
        Self::new("http://localhost:11434", model, 300)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Find the best available model from the preference list.
    pub fn find_best_model(&self) -> Result<String, LlmError> {
        let available = self.list_models()?;
        for preferred in PREFERRED_MODELS {
            if available.iter().any(|m| m.starts_with(preferred)) {
                return Ok(preferred.to_string());
            }
        }
        Err(LlmError::NoModel)
    }

    pub fn is_model_available(&self, model: &str) -> Result<bool, LlmError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(model)))
    }

    pub fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() {
                LlmError::Connection(self.base_url.clone())
            } else {
                LlmError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatMessage,
}

#[derive(Deserialize)]
struct OllamaChatMessage {
    content: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl ChatModel for OllamaChatClient {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                LlmError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                LlmError::Timeout(self.timeout_secs)
            } else {
                LlmError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaChatResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        Ok(parsed.message.content)
    }
}

/// Mock chat model for testing — fixed or scripted responses, optional
/// permanent failure, and a call counter for no-call assertions.
pub struct MockChatModel {
    script: RefCell<VecDeque<String>>,
    fixed: Option<String>,
    fail: bool,
    calls: Cell<usize>,
}

impl MockChatModel {
    /// Always return the same response.
    pub fn always(response: &str) -> Self {
        Self {
            script: RefCell::new(VecDeque::new()),
            fixed: Some(response.to_string()),
            fail: false,
            calls: Cell::new(0),
        }
    }

    /// Return scripted responses in order; errors once exhausted.
    pub fn scripted(responses: Vec<&str>) -> Self {
        Self {
            script: RefCell::new(responses.into_iter().map(String::from).collect()),
            fixed: None,
            fail: false,
            calls: Cell::new(0),
        }
    }

    /// Fail every call, as an unreachable provider would.
    pub fn failing() -> Self {
        Self {
            script: RefCell::new(VecDeque::new()),
            fixed: None,
            fail: true,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ChatModel for MockChatModel {
    fn chat(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(LlmError::Connection("mock provider down".into()));
        }
        if let Some(next) = self.script.borrow_mut().pop_front() {
            return Ok(next);
        }
        self.fixed.clone().ok_or(LlmError::ScriptExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_fixed_response() {
        let mock = MockChatModel::always("回覆");
        let out = mock.chat(&[ChatMessage::user("嗨")]).unwrap();
        assert_eq!(out, "回覆");
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn mock_scripted_responses_in_order() {
        let mock = MockChatModel::scripted(vec!["first", "second"]);
        assert_eq!(mock.chat(&[]).unwrap(), "first");
        assert_eq!(mock.chat(&[]).unwrap(), "second");
        assert!(matches!(mock.chat(&[]), Err(LlmError::ScriptExhausted)));
        assert_eq!(mock.calls(), 3);
    }

    #[test]
    fn mock_failing_always_errors() {
        let mock = MockChatModel::failing();
        assert!(mock.chat(&[ChatMessage::user("hi")]).is_err());
        assert!(mock.chat(&[ChatMessage::user("hi")]).is_err());
        assert_eq!(mock.calls(), 2);
    }

    #[test]
    fn chat_message_constructors() {
        assert_eq!(ChatMessage::system("s").role, ChatRole::System);
        assert_eq!(ChatMessage::user("u").role, ChatRole::User);
        assert_eq!(ChatMessage::assistant("a").role, ChatRole::Assistant);
    }

    #[test]
    fn chat_message_serializes_lowercase_role() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = OllamaChatClient::new("http://localhost:11434/", "medgemma", 60);
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model(), "medgemma");
    }

    #[test]
    fn default_local_uses_standard_port() {
        let client = OllamaChatClient::default_local("medgemma");
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.timeout_secs, 300);
    }

    #[test]
    fn model_preference_order() {
        assert_eq!(PREFERRED_MODELS[0], "medgemma");
        assert!(PREFERRED_MODELS.len() >= 3);
    }
}
