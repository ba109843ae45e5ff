//! Markdown rendering of a finished conversation

use statsift_domain::Message;

/// Markdown transcript renderer
pub struct Transcript;

impl Transcript {
    /// Render every message as a `#### <Role>` block separated by rules
    ///
    /// # Examples
    ///
    /// ```
    /// use statsift_domain::Message;
    /// use statsift_extractor::Transcript;
    ///
    /// let md = Transcript::to_markdown(&[Message::human("Analyze the paper.")]);
    /// assert!(md.starts_with("#### Human\n"));
    /// ```
    pub fn to_markdown(messages: &[Message]) -> String {
        let mut out = String::new();

        for message in messages {
            out.push_str(&format!("#### {}\n", message.role()));

            match message {
                Message::Ai(ai) => {
                    if let Some(model) = &ai.model {
                        out.push_str(&format!("Model: `{}`\n\n", model));
                    }
                    if !ai.content.is_empty() {
                        out.push_str(&ai.content);
                        out.push_str("\n\n");
                    }
                    if ai.has_tool_calls() {
                        let calls = serde_json::to_string_pretty(&ai.tool_calls)
                            .unwrap_or_else(|e| format!("<unrenderable tool calls: {}>", e));
                        out.push_str("*Tool calls*\n");
                        out.push_str(&format!("```json\n{}\n```\n", calls));
                    }
                }
                Message::ToolResult(result) => {
                    out.push_str(&format!("Tool name: `{}`\n\n", result.name));
                    out.push_str(&format!("Result:\n{}\n", result.content));
                }
                Message::System { content } | Message::Human { content } => {
                    out.push_str(content);
                    out.push_str("\n\n");
                }
            }

            out.push_str("\n---\n\n");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use statsift_domain::{AiMessage, ToolCall};

    #[test]
    fn test_transcript_sections() {
        let mut ai = AiMessage::with_tool_calls(vec![ToolCall::new(
            "call_1",
            "read_section",
            json!({"index": "3"}),
        )]);
        ai.model = Some("gpt-4o".into());

        let messages = vec![
            Message::system("sys"),
            Message::Ai(ai),
            Message::tool_result("call_1", "read_section", "Could not find section."),
        ];
        let md = Transcript::to_markdown(&messages);

        assert!(md.starts_with("#### System\nsys\n\n\n---\n\n"));
        assert!(md.contains("#### AI\nModel: `gpt-4o`"));
        assert!(md.contains("*Tool calls*\n```json\n"));
        assert!(md.contains("\"read_section\""));
        assert!(md.contains("#### Tool\nTool name: `read_section`\n\nResult:\nCould not find section.\n"));
        assert_eq!(md.matches("\n---\n").count(), 3);
    }

    #[test]
    fn test_empty_transcript() {
        assert!(Transcript::to_markdown(&[]).is_empty());
    }
}
