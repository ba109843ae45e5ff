//! The extraction loop state machine
//!
//! ```text
//!            has tool calls             no terminal call
//! ModelTurn ───────────────→ ToolTurn ───────────────────→ ModelTurn
//!     │ no tool calls            │ terminal call
//!     ↓                          ↓
//! Terminal(Completed)      Terminal(FinalReported)
//! ```
//!
//! A ModelTurn that would exceed the round-trip budget ends the run in
//! `Terminal(RecursionBudgetExceeded)` and keeps the findings gathered so far.

use crate::accumulator::ResultAccumulator;
use crate::capability::CapabilitySet;
use crate::conversation::ConversationState;
use crate::error::ExtractorError;
use crate::types::{ExtractionReport, LoopOutcome};
use statsift_document::Document;
use statsift_domain::{CapabilitySchema, Message, ReasoningService};
use statsift_llm::{ResilientInvoker, Sleeper};
use tracing::{debug, info, warn};

/// Current state of an [`ExtractionLoop`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Query the reasoning service next
    ModelTurn,
    /// Execute the pending calls of the latest AI message next
    ToolTurn,
    /// Finished
    Terminal(LoopOutcome),
}

/// One document's extraction run
///
/// Owns its conversation and accumulator; nothing is shared between runs.
pub struct ExtractionLoop<'a, S: ?Sized, Z> {
    invoker: ResilientInvoker<S, Z>,
    capabilities: CapabilitySet<'a>,
    schemas: Vec<CapabilitySchema>,
    conversation: ConversationState,
    accumulator: ResultAccumulator,
    state: LoopState,
    round_trips: usize,
    max_round_trips: usize,
}

impl<'a, S, Z> ExtractionLoop<'a, S, Z>
where
    S: ReasoningService + ?Sized,
    Z: Sleeper,
{
    /// Create a loop in `ModelTurn` over an initial conversation
    pub fn new(
        invoker: ResilientInvoker<S, Z>,
        document: &'a Document,
        conversation: ConversationState,
        max_round_trips: usize,
    ) -> Self {
        Self {
            invoker,
            capabilities: CapabilitySet::new(document),
            schemas: CapabilitySet::schemas(),
            conversation,
            accumulator: ResultAccumulator::new(),
            state: LoopState::ModelTurn,
            round_trips: 0,
            max_round_trips,
        }
    }

    /// Current state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Model turns taken so far
    pub fn round_trips(&self) -> usize {
        self.round_trips
    }

    /// The conversation so far
    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    /// Findings reported so far
    pub fn accumulator(&self) -> &ResultAccumulator {
        &self.accumulator
    }

    /// Whether the loop has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, LoopState::Terminal(_))
    }

    /// Perform one state transition and return the new state.
    ///
    /// Calling `step` in `Terminal` is a no-op.
    pub async fn step(&mut self) -> Result<LoopState, ExtractorError> {
        self.state = match self.state {
            LoopState::ModelTurn => self.model_turn().await?,
            LoopState::ToolTurn => self.tool_turn(),
            terminal @ LoopState::Terminal(_) => terminal,
        };
        Ok(self.state)
    }

    async fn model_turn(&mut self) -> Result<LoopState, ExtractorError> {
        if self.round_trips >= self.max_round_trips {
            warn!(
                limit = self.max_round_trips,
                findings = self.accumulator.len(),
                "Round-trip budget exhausted, returning partial findings"
            );
            return Ok(LoopState::Terminal(LoopOutcome::RecursionBudgetExceeded {
                limit: self.max_round_trips,
            }));
        }

        self.round_trips += 1;
        let response = self
            .invoker
            .invoke(self.conversation.messages(), &self.schemas)
            .await?;

        info!(
            round_trip = self.round_trips,
            tool_calls = response.tool_calls.len(),
            "Model turn"
        );

        let next = if response.has_tool_calls() {
            LoopState::ToolTurn
        } else {
            LoopState::Terminal(LoopOutcome::Completed)
        };
        self.conversation.push(response);
        Ok(next)
    }

    fn tool_turn(&mut self) -> LoopState {
        let requested = self
            .conversation
            .last_ai_message()
            .map_or(0, |message| message.tool_calls.len());
        let pending = self.conversation.pending_calls();
        if pending.len() < requested {
            debug!(
                skipped = requested - pending.len(),
                "Skipping already executed tool calls"
            );
        }

        let mut terminal = false;
        for (key, call) in pending {
            // the same call may appear twice within one message
            if !self.conversation.mark_processed(key.clone()) {
                debug!(key = %key, "Skipping duplicate tool call");
                continue;
            }

            let output = self.capabilities.execute(&call, &mut self.accumulator);
            terminal |= output.terminal;
            self.conversation
                .push(Message::tool_result(call.id, call.name, output.content));
        }

        if terminal {
            LoopState::Terminal(LoopOutcome::FinalReported)
        } else {
            LoopState::ModelTurn
        }
    }

    /// Drive the loop to `Terminal` and hand over the findings
    ///
    /// # Errors
    ///
    /// Only a failed reasoning-service call aborts the run. Running out of round
    /// trips is a normal outcome carrying partial findings.
    pub async fn run(mut self) -> Result<ExtractionReport, ExtractorError> {
        loop {
            if let LoopState::Terminal(outcome) = self.step().await? {
                info!(
                    outcome = %outcome,
                    findings = self.accumulator.len(),
                    round_trips = self.round_trips,
                    "Extraction finished"
                );
                return Ok(ExtractionReport {
                    findings: self.accumulator.into_findings(),
                    outcome,
                    round_trips: self.round_trips,
                    messages: self.conversation.into_messages(),
                });
            }
        }
    }
}
