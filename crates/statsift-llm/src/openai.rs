//! OpenAI-compatible chat-completions backend
//!
//! Sends the conversation and the capability schemas as `tools` to
//! `<endpoint>/chat/completions`, and maps the first choice back into an
//! [`AiMessage`]. HTTP failures are classified for the retry policy:
//!
//! | status | classification |
//! |---|---|
//! | 429 | `RateLimited` |
//! | 401, 402 | `QuotaExceeded` |
//! | anything else | `Other` |
//!
//! Retries are not performed here; wrap the service in a `ResilientInvoker`.
//!
//! # Examples
//!
//! ```no_run
//! use statsift_llm::OpenAiChatService;
//!
//! let service = OpenAiChatService::new("https://api.openai.com/v1", "gpt-4o")
//!     .with_api_key("sk-...")
//!     .with_temperature(0.0);
//! ```

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use statsift_domain::{
    AiMessage, CapabilitySchema, Message, MessageId, ReasoningService, ServiceError, ToolCall,
};
use std::time::Duration;
use tracing::debug;

/// Default OpenAI API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default timeout for one completion request (5 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Client for an OpenAI-compatible chat-completions API
pub struct OpenAiChatService {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, PartialEq)]
struct WireMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunction,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a CapabilitySchema,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

fn function_type() -> String {
    "function".to_string()
}

impl OpenAiChatService {
    /// Create a client for `endpoint` (e.g. "https://api.openai.com/v1") and `model`
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: None,
            temperature: None,
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Create a client for the public OpenAI endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Send `Authorization: Bearer <key>` with every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Map a non-success HTTP status to a failure class
fn classify(status: StatusCode, body: &str) -> ServiceError {
    let detail = format!("HTTP {}: {}", status, body);
    match status {
        StatusCode::TOO_MANY_REQUESTS => ServiceError::RateLimited(detail),
        StatusCode::UNAUTHORIZED | StatusCode::PAYMENT_REQUIRED => ServiceError::QuotaExceeded(detail),
        _ => ServiceError::Other(detail),
    }
}

fn to_wire(messages: &[Message]) -> Vec<WireMessage> {
    messages
        .iter()
        .map(|message| match message {
            Message::System { content } => WireMessage {
                role: "system",
                content: Some(content.clone()),
                tool_calls: Vec::new(),
                tool_call_id: None,
            },
            Message::Human { content } => WireMessage {
                role: "user",
                content: Some(content.clone()),
                tool_calls: Vec::new(),
                tool_call_id: None,
            },
            Message::Ai(ai) => WireMessage {
                role: "assistant",
                content: if ai.content.is_empty() && ai.has_tool_calls() {
                    None
                } else {
                    Some(ai.content.clone())
                },
                tool_calls: ai
                    .tool_calls
                    .iter()
                    .map(|call| WireToolCall {
                        id: call.id.clone(),
                        kind: function_type(),
                        function: WireFunction {
                            name: call.name.clone(),
                            arguments: call.arguments.to_string(),
                        },
                    })
                    .collect(),
                tool_call_id: None,
            },
            Message::ToolResult(result) => WireMessage {
                role: "tool",
                content: Some(result.content.clone()),
                tool_calls: Vec::new(),
                tool_call_id: Some(result.call_id.clone()),
            },
        })
        .collect()
}

/// Parse tool-call arguments; text that is not JSON is kept as a string value
fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn into_ai_message(response: ChatResponse) -> Result<AiMessage, ServiceError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::Other("Response contained no choices".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolCall::new(call.id, call.function.name, parse_arguments(&call.function.arguments)))
        .collect();

    Ok(AiMessage {
        id: response
            .id
            .map(MessageId::new)
            .unwrap_or_else(MessageId::generate),
        content: choice.message.content.unwrap_or_default(),
        tool_calls,
        model: response.model,
    })
}

#[async_trait]
impl ReasoningService for OpenAiChatService {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn respond(
        &self,
        messages: &[Message],
        capabilities: &[CapabilitySchema],
    ) -> Result<AiMessage, ServiceError> {
        let body = ChatRequest {
            model: &self.model,
            messages: to_wire(messages),
            tools: capabilities
                .iter()
                .map(|schema| WireTool {
                    kind: "function",
                    function: schema,
                })
                .collect(),
            temperature: self.temperature,
        };

        debug!(model = %self.model, messages = messages.len(), "Requesting chat completion");

        let mut request = self.client.post(self.url()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Other(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify(status, &text));
        }

        let parsed = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ServiceError::Other(format!("Failed to parse response: {}", e)))?;

        into_ai_message(parsed)
    }
}
