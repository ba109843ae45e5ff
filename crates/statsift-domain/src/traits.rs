//! Trait definitions for external interactions
//!
//! The reasoning service is an external collaborator: given the conversation so far
//! and the capabilities it may call, it returns the next AI message. Implementations
//! live in `statsift-llm`.

use crate::{AiMessage, CapabilitySchema, Message};
use async_trait::async_trait;
use thiserror::Error;

/// Classified failure of a reasoning-service call
///
/// The classification drives the retry policy: rate limits are retried after a
/// short backoff, quota exhaustion after a long cooldown, anything else is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Quota or concurrency throttling
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failure or exhausted budget
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Any other failure
    #[error("Service error: {0}")]
    Other(String),
}

impl ServiceError {
    /// Short label of the failure class, for logs
    pub fn class(&self) -> &'static str {
        match self {
            ServiceError::RateLimited(_) => "rate_limited",
            ServiceError::QuotaExceeded(_) => "quota_exceeded",
            ServiceError::Other(_) => "other",
        }
    }
}

/// A service that continues a conversation, optionally requesting capability calls
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Name of the model queried, for logs and metadata
    fn model_name(&self) -> &str;

    /// Produce the next AI message for the conversation
    async fn respond(
        &self,
        messages: &[Message],
        capabilities: &[CapabilitySchema],
    ) -> Result<AiMessage, ServiceError>;
}
