//! Statsift Reasoning-Service Layer
//!
//! Implementations of the `ReasoningService` trait from `statsift-domain`, and the
//! retry machinery that wraps every call to them.
//!
//! # Services
//!
//! - `MockService`: scripted responses for deterministic tests
//! - `OpenAiChatService`: any OpenAI-compatible chat-completions endpoint
//!
//! # Retry
//!
//! `ResilientInvoker` applies a `RetryPolicy` (per-failure-class waits, one attempt
//! budget) and waits through an injectable `Sleeper`.

#![warn(missing_docs)]

pub mod error;
pub mod openai;
pub mod retry;

use async_trait::async_trait;
use statsift_domain::{AiMessage, CapabilitySchema, Message, ReasoningService, ServiceError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use error::InvokeError;
pub use openai::OpenAiChatService;
pub use retry::{RecordingSleeper, ResilientInvoker, RetryPolicy, Sleeper, TokioSleeper};

/// Text returned by [`MockService`] once its script is used up
pub const MOCK_DEFAULT_REPLY: &str = "No further actions.";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted reasoning service for deterministic testing
///
/// Each call to `respond` pops the next scripted outcome. When the script is empty
/// it answers with a plain text message (no tool calls), which ends an extraction
/// loop. Every conversation it receives is recorded. Clones share script and log.
///
/// # Examples
///
/// ```
/// use statsift_llm::MockService;
/// use statsift_domain::{AiMessage, ReasoningService, ServiceError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let service = MockService::new();
/// service.push_response(AiMessage::text("first"));
/// service.push_error(ServiceError::Other("boom".into()));
///
/// assert_eq!(service.respond(&[], &[]).await.unwrap().content, "first");
/// assert!(service.respond(&[], &[]).await.is_err());
/// assert!(!service.respond(&[], &[]).await.unwrap().has_tool_calls());
/// assert_eq!(service.call_count(), 3);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockService {
    script: Arc<Mutex<VecDeque<Result<AiMessage, ServiceError>>>>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockService {
    /// Create a service with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service that replays `responses` in order
    pub fn with_responses(responses: impl IntoIterator<Item = AiMessage>) -> Self {
        let service = Self::new();
        for response in responses {
            service.push_response(response);
        }
        service
    }

    /// Queue a successful response
    pub fn push_response(&self, message: AiMessage) {
        lock(&self.script).push_back(Ok(message));
    }

    /// Queue a failure
    pub fn push_error(&self, error: ServiceError) {
        lock(&self.script).push_back(Err(error));
    }

    /// Number of times `respond` was called
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Conversations received, one per call
    pub fn requests(&self) -> Vec<Vec<Message>> {
        lock(&self.requests).clone()
    }

    /// Number of scripted outcomes not yet consumed
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }
}

#[async_trait]
impl ReasoningService for MockService {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn respond(
        &self,
        messages: &[Message],
        _capabilities: &[CapabilitySchema],
    ) -> Result<AiMessage, ServiceError> {
        lock(&self.requests).push(messages.to_vec());

        let next = lock(&self.script).pop_front();
        match next {
            Some(outcome) => outcome,
            None => Ok(AiMessage::text(MOCK_DEFAULT_REPLY)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statsift_domain::ToolCall;

    #[tokio::test]
    async fn test_mock_service_script_order() {
        let service = MockService::with_responses(vec![
            AiMessage::text("one"),
            AiMessage::with_tool_calls(vec![ToolCall::new(
                "call_1",
                "read_section",
                serde_json::json!({"index": "2"}),
            )]),
        ]);

        assert_eq!(service.remaining(), 2);
        assert_eq!(service.respond(&[], &[]).await.unwrap().content, "one");
        let second = service.respond(&[], &[]).await.unwrap();
        assert_eq!(second.tool_calls[0].name, "read_section");
        assert_eq!(service.remaining(), 0);
    }

    #[tokio::test]
    async fn test_mock_service_default_reply() {
        let service = MockService::new();
        let reply = service.respond(&[], &[]).await.unwrap();
        assert_eq!(reply.content, MOCK_DEFAULT_REPLY);
        assert!(!reply.has_tool_calls());
    }

    #[tokio::test]
    async fn test_mock_service_records_requests() {
        let service = MockService::new();
        let conversation = vec![Message::system("sys"), Message::human("task")];
        service.respond(&conversation, &[]).await.unwrap();

        assert_eq!(service.call_count(), 1);
        assert_eq!(service.requests()[0], conversation);
    }

    #[tokio::test]
    async fn test_mock_service_errors() {
        let service = MockService::new();
        service.push_error(ServiceError::RateLimited("slow".into()));
        let result = service.respond(&[], &[]).await;
        assert!(matches!(result, Err(ServiceError::RateLimited(_))));
    }

    #[tokio::test]
    async fn test_mock_service_clone_shares_state() {
        let first = MockService::new();
        let second = first.clone();
        first.push_response(AiMessage::text("shared"));

        assert_eq!(second.respond(&[], &[]).await.unwrap().content, "shared");
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 1);
    }
}
