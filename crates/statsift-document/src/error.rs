//! Error types for document loading and lookup

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or querying a document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A required element (title, abstract) is absent
    #[error("Missing element: {0}")]
    MissingElement(&'static str),

    /// No section matches the address or title
    #[error("No section with index or title \"{0}\" available")]
    SectionNotFound(String),

    /// No table matches the address
    #[error("No table with index \"{0}\" available")]
    TableNotFound(String),

    /// Table rows could not be serialized
    #[error("CSV error: {0}")]
    Csv(String),
}

impl DocumentError {
    /// Whether this is a lookup miss the caller can recover from
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DocumentError::SectionNotFound(_) | DocumentError::TableNotFound(_)
        )
    }
}
