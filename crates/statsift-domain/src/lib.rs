//! Statsift Domain Layer
//!
//! Core value types shared by every Statsift crate. Nothing here performs I/O;
//! infrastructure (document parsing, reasoning backends, the extraction loop)
//! lives in other crates and depends on these definitions.
//!
//! ## Key Concepts
//!
//! - **Finding**: one structured statistical test record (test name, sample size,
//!   p-value, effect sizes with confidence intervals, per-factor results)
//! - **Message**: one entry of the conversation held with a reasoning service
//! - **ToolCall / CallKey**: a capability invocation requested by the service and
//!   its deduplication key
//! - **CapabilitySchema**: the declared name, description and input schema of a
//!   capability, as advertised to the service
//! - **ReasoningService**: the trait every backend implements

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capability;
pub mod finding;
pub mod message;
pub mod traits;

// Re-exports for convenience
pub use capability::CapabilitySchema;
pub use finding::{ConfidenceInterval, EffectSize, Factor, Finding, UNKNOWN};
pub use message::{AiMessage, CallKey, Message, MessageId, ToolCall, ToolResultMessage};
pub use traits::{ReasoningService, ServiceError};
