//! Node-level and transport-level error types.

use std::collections::HashMap;

use thiserror::Error;

/// Errors returned by a node's `execute` method.
///
/// The host uses the variant to decide retry behaviour:
/// - `Retryable` — the item may be re-queued with back-off.
/// - `Fatal`     — the execution is immediately marked as failed.
#[derive(Debug, Error, Clone)]
pub enum NodeError {
    /// Transient failure; the host may re-try the job.
    #[error("retryable node error: {0}")]
    Retryable(String),

    /// Permanent failure; no retry should be attempted.
    #[error("fatal node error: {0}")]
    Fatal(String),
}

/// A failed round trip reported by an [`HttpTransport`](crate::HttpTransport).
///
/// Carries the HTTP status (absent for network-level failures) and the
/// response headers so callers can classify the failure without parsing
/// the message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", describe(.status, .message))]
pub struct TransportError {
    pub status: Option<u16>,
    /// Header names are stored lower-cased.
    pub headers: HashMap<String, String>,
    pub message: String,
}

impl TransportError {
    /// A non-2xx response.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            headers: HashMap::new(),
            message: message.into(),
        }
    }

    /// A failure that never produced a response (DNS, TLS, connection reset...).
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            headers: HashMap::new(),
            message: message.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

fn describe(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("HTTP {status}: {message}"),
        None => format!("transport failure: {message}"),
    }
}
