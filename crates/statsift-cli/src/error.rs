//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document could not be read or indexed
    #[error("Document error: {0}")]
    Document(#[from] statsift_document::DocumentError),

    /// Extraction run failed
    #[error("Extraction error: {0}")]
    Extractor(#[from] statsift_extractor::ExtractorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The API key environment variable is unset
    #[error("Missing API key: set the {0} environment variable")]
    MissingApiKey(String),

    /// Some documents in a batch failed
    #[error("{failed} of {total} document(s) failed")]
    BatchFailed {
        /// Failed documents
        failed: usize,
        /// Documents attempted
        total: usize,
    },
}
