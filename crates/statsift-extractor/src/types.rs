//! Outcome and report types of an extraction run

use serde::{Deserialize, Serialize};
use statsift_domain::{Finding, Message};
use std::fmt;

/// How an extraction run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoopOutcome {
    /// The service answered without calling any capability
    Completed,

    /// A terminal capability was executed
    FinalReported,

    /// The round-trip budget ran out; findings are partial
    RecursionBudgetExceeded {
        /// The budget that was exhausted
        limit: usize,
    },
}

impl LoopOutcome {
    /// Whether the run was cut short
    pub fn is_partial(&self) -> bool {
        matches!(self, LoopOutcome::RecursionBudgetExceeded { .. })
    }
}

impl fmt::Display for LoopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopOutcome::Completed => write!(f, "completed"),
            LoopOutcome::FinalReported => write!(f, "final reported"),
            LoopOutcome::RecursionBudgetExceeded { limit } => {
                write!(f, "budget of {} round trips exceeded", limit)
            }
        }
    }
}

/// Result of one extraction run
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Reported findings, in call order
    pub findings: Vec<Finding>,

    /// How the run ended
    pub outcome: LoopOutcome,

    /// Model turns taken
    pub round_trips: usize,

    /// Full conversation, for transcripts
    pub messages: Vec<Message>,
}

impl ExtractionReport {
    /// Number of findings
    pub fn finding_count(&self) -> usize {
        self.findings.len()
    }

    /// Number of tool results in the conversation
    pub fn tool_result_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| matches!(m, Message::ToolResult(_)))
            .count()
    }
}
