//! Error types for resilient invocation

use statsift_domain::ServiceError;
use thiserror::Error;

/// Failure of a resilient reasoning-service call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// Retryable failures persisted through the whole attempt budget
    #[error("Reasoning service still failing after {attempts} attempts: {last}")]
    ExhaustedRetries {
        /// Attempts made, including the first
        attempts: u32,
        /// Error returned by the final attempt
        last: ServiceError,
    },

    /// Unclassified failure, never retried
    #[error("Reasoning service failed: {0}")]
    Fatal(ServiceError),
}

impl InvokeError {
    /// The service error that ended the invocation
    pub fn service_error(&self) -> &ServiceError {
        match self {
            InvokeError::ExhaustedRetries { last, .. } => last,
            InvokeError::Fatal(error) => error,
        }
    }
}
