//! DocuSign node error types.

use nodes::{NodeError, TransportError};
use thiserror::Error;

use crate::retry::is_retryable_error;

pub type Result<T, E = DocuSignError> = std::result::Result<T, E>;

/// Errors produced while turning one input item into DocuSign API calls.
#[derive(Debug, Error)]
pub enum DocuSignError {
    // ------ Raised before any I/O ------

    /// A parameter is missing or malformed.  The message names the field.
    #[error("{0}")]
    Validation(String),

    /// A URL field points at a loopback, link-local or metadata address.
    #[error("{field} must be a valid URL")]
    SsrfRejected { field: String },

    /// The (resource, operation) pair is not in the routing table.
    #[error("Unknown operation {operation} for resource {resource}")]
    UnknownOperation { resource: String, operation: String },

    // ------ Raised by the round trip ------

    /// Surfaced unchanged from the host's HTTP layer.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// DocuSign answered 2xx with a body that is not JSON.
    #[error("invalid JSON in DocuSign response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocuSignError {
    pub fn validation(message: impl Into<String>) -> Self {
        DocuSignError::Validation(message.into())
    }

    /// True for errors raised before any request was sent.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DocuSignError::Validation(_)
                | DocuSignError::SsrfRejected { .. }
                | DocuSignError::UnknownOperation { .. }
        )
    }
}

impl From<DocuSignError> for NodeError {
    fn from(err: DocuSignError) -> Self {
        if is_retryable_error(&err) {
            NodeError::Retryable(err.to_string())
        } else {
            NodeError::Fatal(err.to_string())
        }
    }
}
