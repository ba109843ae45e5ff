//! Conversation log of one extraction run

use statsift_domain::{AiMessage, CallKey, Message, ToolCall};
use std::collections::HashSet;

/// Append-only message log plus the keys of tool calls already executed
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
    processed: HashSet<CallKey>,
}

impl ConversationState {
    /// Start a conversation from the system and task prompts
    pub fn new(system_prompt: impl Into<String>, task_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::human(task_prompt)],
            processed: HashSet::new(),
        }
    }

    /// Append a message
    pub fn push(&mut self, message: impl Into<Message>) {
        self.messages.push(message.into());
    }

    /// Every message so far, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages so far
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent AI message
    pub fn last_ai_message(&self) -> Option<&AiMessage> {
        self.messages.iter().rev().find_map(Message::as_ai)
    }

    /// Calls of the most recent AI message that have not been executed yet, with their keys
    pub fn pending_calls(&self) -> Vec<(CallKey, ToolCall)> {
        let Some(message) = self.last_ai_message() else {
            return Vec::new();
        };
        message
            .tool_calls
            .iter()
            .map(|call| (call.key(&message.id), call.clone()))
            .filter(|(key, _)| !self.processed.contains(key))
            .collect()
    }

    /// Whether a call was already executed
    pub fn is_processed(&self, key: &CallKey) -> bool {
        self.processed.contains(key)
    }

    /// Record a call as executed; returns false if it already was
    pub fn mark_processed(&mut self, key: CallKey) -> bool {
        self.processed.insert(key)
    }

    /// Number of distinct calls executed
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Give up the log
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read(id: &str, index: &str) -> ToolCall {
        ToolCall::new(id, "read_section", json!({ "index": index }))
    }

    #[test]
    fn test_new_conversation() {
        let state = ConversationState::new("sys", "task");
        assert_eq!(state.len(), 2);
        assert_eq!(state.messages()[0].role(), "System");
        assert_eq!(state.messages()[1].content(), "task");
        assert!(state.last_ai_message().is_none());
        assert!(state.pending_calls().is_empty());
    }

    #[test]
    fn test_pending_calls_skip_processed() {
        let mut state = ConversationState::new("sys", "task");
        let message = AiMessage::with_tool_calls(vec![read("a", "1"), read("b", "2")]).with_id("m1");
        state.push(message);

        let pending = state.pending_calls();
        assert_eq!(pending.len(), 2);

        assert!(state.mark_processed(pending[0].0.clone()));
        assert!(!state.mark_processed(pending[0].0.clone()));

        let pending = state.pending_calls();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].1.id, "b");
        assert_eq!(state.processed_count(), 1);
    }

    #[test]
    fn test_same_call_id_in_new_message_is_pending() {
        let mut state = ConversationState::new("sys", "task");
        state.push(AiMessage::with_tool_calls(vec![read("a", "1")]).with_id("m1"));
        for (key, _) in state.pending_calls() {
            state.mark_processed(key);
        }

        state.push(AiMessage::with_tool_calls(vec![read("a", "1")]).with_id("m2"));
        assert_eq!(state.pending_calls().len(), 1);

        state.push(AiMessage::with_tool_calls(vec![read("a", "1")]).with_id("m1"));
        assert!(state.pending_calls().is_empty());
    }
}
