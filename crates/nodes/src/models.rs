//! Value types exchanged between the host and a node.
//!
//! Requests and responses are deliberately transport-agnostic: a node
//! describes *what* to send and the host's [`HttpTransport`](crate::HttpTransport)
//! decides how (authentication, TLS, proxies).

use std::collections::HashMap;
use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// A single outgoing request, built by a node and executed by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub url: String,
    pub query: Vec<(String, String)>,
    /// Extra headers on top of whatever the transport adds (auth, accept).
    pub headers: Vec<(String, String)>,
    /// JSON body; `None` for read operations.
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Value of a query parameter, if set.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A 200 response carrying `value` serialised as JSON.
    pub fn json_body(value: &Value) -> Self {
        Self {
            status: 200,
            headers: HashMap::from([("content-type".to_owned(), "application/json".to_owned())]),
            body: value.to_string().into_bytes(),
        }
    }

    /// A 200 response carrying raw bytes.
    pub fn bytes(body: Vec<u8>, content_type: &str) -> Self {
        Self {
            status: 200,
            headers: HashMap::from([("content-type".to_owned(), content_type.to_owned())]),
            body,
        }
    }

    /// Parse the body as JSON.  An empty body (e.g. `204 No Content`) is `{}`.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(json!({}));
        }
        serde_json::from_slice(&self.body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A binary attachment in the form the host stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryData {
    /// Base64 (standard alphabet, padded).
    pub data: String,
    pub file_name: String,
    pub mime_type: String,
}

impl BinaryData {
    pub fn from_bytes(bytes: &[u8], file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: general_purpose::STANDARD.encode(bytes),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// One logical result row handed back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    pub json: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<BinaryData>,
    /// Index of the input item this record was produced from.
    pub paired_item: usize,
}

impl OutputRecord {
    pub fn new(json: Value, paired_item: usize) -> Self {
        Self {
            json,
            binary: None,
            paired_item,
        }
    }

    /// A record capturing a per-item failure under continue-on-failure.
    pub fn error(message: impl Into<String>, paired_item: usize) -> Self {
        Self::new(json!({ "error": message.into() }), paired_item)
    }

    pub fn with_binary(mut self, binary: BinaryData) -> Self {
        self.binary = Some(binary);
        self
    }

    /// The captured error message, if this is an error record.
    pub fn error_message(&self) -> Option<&str> {
        self.json.get("error").and_then(Value::as_str)
    }
}
