//! Conversation model shared by the extraction loop and reasoning backends

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one AI response message
///
/// Backends usually supply their own id (e.g. a completion id). When they do not,
/// [`MessageId::generate`] produces a UUIDv7 so that every AI message still has a
/// distinct id for tool-call deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap an id supplied by a backend
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh UUIDv7-based id
    ///
    /// # Examples
    ///
    /// ```
    /// use statsift_domain::MessageId;
    ///
    /// let a = MessageId::generate();
    /// let b = MessageId::generate();
    /// assert_ne!(a, b);
    /// ```
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A capability invocation requested by the reasoning service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call id, unique within one AI message only
    pub id: String,

    /// Capability name as sent by the service
    pub name: String,

    /// Raw JSON arguments
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Create a tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Deduplication key of this call within the AI message that carried it
    pub fn key(&self, message_id: &MessageId) -> CallKey {
        CallKey {
            call_id: self.id.clone(),
            message_id: message_id.clone(),
        }
    }
}

/// Composite deduplication key: (call id, originating AI message id)
///
/// Call ids alone are not unique across separate model turns, so a call is only
/// considered already executed when both halves match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallKey {
    /// Tool call id
    pub call_id: String,
    /// Id of the AI message that carried the call
    pub message_id: MessageId,
}

impl fmt::Display for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.call_id, self.message_id)
    }
}

/// A response produced by the reasoning service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiMessage {
    /// Message id used for deduplication
    pub id: MessageId,

    /// Free-text content (may be empty when only tools are called)
    #[serde(default)]
    pub content: String,

    /// Requested capability invocations, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Model that produced the message, if the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl AiMessage {
    /// A plain text response with a generated id
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            content: content.into(),
            tool_calls: Vec::new(),
            model: None,
        }
    }

    /// A response carrying tool calls with a generated id
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            id: MessageId::generate(),
            content: String::new(),
            tool_calls,
            model: None,
        }
    }

    /// Replace the message id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = MessageId::new(id);
        self
    }

    /// Whether the service asked for any capability
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Result of executing one tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResultMessage {
    /// Id of the call this answers
    pub call_id: String,

    /// Capability name as requested
    pub name: String,

    /// Human-readable result text
    pub content: String,
}

/// One entry of the conversation with the reasoning service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// System instructions
    System {
        /// Prompt text
        content: String,
    },
    /// Task given by the human caller
    Human {
        /// Prompt text
        content: String,
    },
    /// Response from the reasoning service
    Ai(AiMessage),
    /// Output of a capability
    ToolResult(ToolResultMessage),
}

impl Message {
    /// Build a system message
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Build a human message
    pub fn human(content: impl Into<String>) -> Self {
        Message::Human {
            content: content.into(),
        }
    }

    /// Build a tool result message
    pub fn tool_result(
        call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Message::ToolResult(ToolResultMessage {
            call_id: call_id.into(),
            name: name.into(),
            content: content.into(),
        })
    }

    /// Role label used in logs and transcripts
    pub fn role(&self) -> &'static str {
        match self {
            Message::System { .. } => "System",
            Message::Human { .. } => "Human",
            Message::Ai(_) => "AI",
            Message::ToolResult(_) => "Tool",
        }
    }

    /// Text content of the message
    pub fn content(&self) -> &str {
        match self {
            Message::System { content } | Message::Human { content } => content,
            Message::Ai(ai) => &ai.content,
            Message::ToolResult(result) => &result.content,
        }
    }

    /// The AI message, if this is one
    pub fn as_ai(&self) -> Option<&AiMessage> {
        match self {
            Message::Ai(ai) => Some(ai),
            _ => None,
        }
    }
}

impl From<AiMessage> for Message {
    fn from(ai: AiMessage) -> Self {
        Message::Ai(ai)
    }
}
