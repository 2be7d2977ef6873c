//! Chat-completions client for OpenAI-compatible APIs.
//!
//! Works against the hosted OpenAI endpoint or any server exposing the same
//! `/v1/chat/completions` shape (Ollama, vLLM, LocalAI), including
//! function-calling tools.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};
use wfi_core::{ChatMessage, ChatRequest, ChatResponse, CoreError, Llm, Role, ToolCall};

/// The default chat API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// The default chat model.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// An [`Llm`] backed by an OpenAI-compatible chat-completions API.
///
/// # Configuration
///
/// - `model` – defaults to `gpt-4o-mini`.
/// - `base_url` – defaults to the hosted OpenAI endpoint.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment variable.
/// - `timeout` – per-request timeout; on expiry the call fails with
///   [`CoreError::Llm`] and no partial state is retained.
pub struct OpenAiChatModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiChatModel {
    /// Create a new client with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> wfi_core::Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(CoreError::Llm {
                provider: "openai".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
        })
    }

    /// Create a new client from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> wfi_core::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| CoreError::Llm {
            provider: "openai".into(),
            message: "OPENAI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at an OpenAI-compatible server (e.g. `http://localhost:11434/v1`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> wfi_core::Result<Self> {
        self.client =
            reqwest::Client::builder().timeout(timeout).build().map_err(|e| CoreError::Llm {
                provider: "openai".into(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(self)
    }

    fn llm_error(&self, message: String) -> CoreError {
        CoreError::Llm { provider: self.model.clone(), message }
    }
}

// ── wire types ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct WireTool {
    r#type: &'static str,
    function: WireFunction,
}

#[derive(Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    r#type: String,
    function: WireToolCallFunction,
}

#[derive(Serialize, Deserialize)]
struct WireToolCallFunction {
    name: String,
    /// JSON-encoded arguments object, per the OpenAI wire format.
    arguments: String,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

fn to_wire(message: &ChatMessage) -> WireMessage {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };
    WireMessage {
        role,
        content: message.content.clone(),
        tool_calls: message
            .tool_calls
            .iter()
            .map(|call| WireToolCall {
                id: call.id.clone(),
                r#type: "function".to_string(),
                function: WireToolCallFunction {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect(),
        tool_call_id: message.tool_call_id.clone(),
    }
}

#[async_trait]
impl Llm for OpenAiChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: ChatRequest) -> wfi_core::Result<ChatResponse> {
        let config = request.config.unwrap_or_default();
        let body = WireRequest {
            model: &self.model,
            messages: request.messages.iter().map(to_wire).collect(),
            tools: request
                .tools
                .into_iter()
                .map(|t| WireTool {
                    r#type: "function",
                    function: WireFunction {
                        name: t.name,
                        description: t.description,
                        parameters: t.parameters,
                    },
                })
                .collect(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        debug!(model = %self.model, messages = body.messages.len(), "chat request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "chat request failed");
                self.llm_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(%status, "chat API error");
            return Err(self.llm_error(format!("API returned {status}: {detail}")));
        }

        let parsed: WireResponse = response
            .json()
            .await
            .map_err(|e| self.llm_error(format!("failed to parse response: {e}")))?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| self.llm_error("API returned no choices".to_string()))?
            .message;

        let mut tool_calls = Vec::new();
        for call in message.tool_calls.unwrap_or_default() {
            let arguments =
                serde_json::from_str(&call.function.arguments).map_err(|e| {
                    self.llm_error(format!(
                        "malformed arguments for tool '{}': {e}",
                        call.function.name
                    ))
                })?;
            tool_calls.push(ToolCall { id: call.id, name: call.function.name, arguments });
        }

        Ok(ChatResponse { content: message.content.unwrap_or_default(), tool_calls })
    }
}
