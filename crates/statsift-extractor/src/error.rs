//! Error types for the Extractor

use statsift_document::DocumentError;
use statsift_llm::InvokeError;
use thiserror::Error;

/// Errors that abort an extraction run
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The reasoning service could not be reached
    #[error("Reasoning service error: {0}")]
    Invoke(#[from] InvokeError),

    /// The document lacks something the run needs
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure of one capability call
///
/// Never leaves the capability layer: its `Display` text is what the reasoning
/// service reads as the tool result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CapabilityError {
    /// The service named a capability that does not exist
    #[error("Error: tool '{name}' does not exist. Available tools: {available}")]
    UnknownCapability {
        name: String,
        available: String,
    },

    /// Arguments did not match the capability's schema
    #[error("Error: invalid arguments for '{name}': {detail}")]
    InvalidArguments { name: String, detail: String },

    /// Address or title did not resolve; the payload is "section" or "table"
    #[error("Could not find {0}.")]
    NotFound(&'static str),
}
