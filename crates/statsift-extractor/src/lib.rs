//! Statsift Extractor
//!
//! Drives a reasoning service through repeated "inspect document, propose
//! findings" cycles until it reports that it is done.
//!
//! # Architecture
//!
//! ```text
//! Document → PromptBuilder → ConversationState
//!                                   ↓
//!          ┌── ModelTurn (ResilientInvoker → ReasoningService)
//!          │        ↓ tool calls
//!          └── ToolTurn (CapabilitySet → Document / ResultAccumulator)
//!                   ↓ terminal call, no calls, or budget exhausted
//!             ExtractionReport
//! ```
//!
//! # Key Features
//!
//! - **Capabilities**: `read_section`, `read_table`, `report_test`, `report_final`;
//!   failures become tool-result text, never errors
//! - **Deduplication**: each (call id, message id) pair executes at most once
//! - **Round-trip budget**: exhausting it returns the findings gathered so far
//! - **Retries**: rate-limit and quota failures are waited out per `RetryPolicy`
//!
//! # Example Usage
//!
//! ```
//! use statsift_document::Document;
//! use statsift_domain::{AiMessage, ToolCall};
//! use statsift_extractor::{Extractor, ExtractorConfig, LoopOutcome};
//! use statsift_llm::{MockService, RecordingSleeper};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let html = r#"<html><head><title>A Study</title></head><body>
//!   <div class="abstract"><p>We ran a study.</p></div></body></html>"#;
//! let document = Document::from_html(html)?;
//!
//! let service = MockService::with_responses(vec![AiMessage::with_tool_calls(vec![
//!     ToolCall::new("c1", "report_test", json!({"test_name": "t-test", "effectsizes": []})),
//!     ToolCall::new("c2", "report_final", json!({})),
//! ])]);
//!
//! let extractor = Extractor::with_sleeper(
//!     Arc::new(service),
//!     RecordingSleeper::new(),
//!     ExtractorConfig::default(),
//! )?;
//! let report = extractor.extract(&document).await?;
//!
//! assert_eq!(report.findings.len(), 1);
//! assert_eq!(report.outcome, LoopOutcome::FinalReported);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod accumulator;
mod capability;
mod config;
mod conversation;
mod error;
mod extraction;
mod extractor;
mod prompt;
mod transcript;
mod types;


pub use accumulator::ResultAccumulator;
pub use capability::{
    Capability, CapabilityOutput, CapabilitySet, CAPABILITY_NAMES, FINAL_ACK, READ_SECTION,
    READ_TABLE, REPORT_ACK, REPORT_FINAL, REPORT_TEST,
};
pub use config::{ExtractorConfig, DEFAULT_MAX_ROUND_TRIPS};
pub use conversation::ConversationState;
pub use error::ExtractorError;
pub use extraction::{ExtractionLoop, LoopState};
pub use extractor::Extractor;
pub use prompt::{system_prompt, PromptBuilder};
pub use transcript::Transcript;
pub use types::{ExtractionReport, LoopOutcome};
