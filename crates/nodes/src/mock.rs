//! Test doubles for the host seams.
//!
//! Useful in unit and integration tests where a real host (parameter
//! store, authenticated HTTP client, binary storage) is unavailable.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{HttpRequest, HttpResponse};
use crate::traits::{BinaryHelper, ExecutionContext, HttpTransport, ParameterAccessor};
use crate::TransportError;

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync;

/// What the transport does when the reply queue is empty.
enum Fallback {
    /// Reply `{}` with status 200.
    EmptyJson,
    /// Compute the reply from the request.
    Responder(Box<Responder>),
}

/// A transport that records every request it receives and replays
/// programmer-specified replies in order.
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    fallback: Fallback,
    /// All requests seen by this transport (in call order).
    pub calls: Arc<Mutex<Vec<HttpRequest>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// A transport that answers `{}` to everything.
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Fallback::EmptyJson,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A transport whose replies are computed from each request.
    pub fn responding<F>(f: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            fallback: Fallback::Responder(Box::new(f)),
            ..Self::new()
        }
    }

    /// Queue a JSON reply.
    pub fn push_json(self, value: Value) -> Self {
        self.push(Ok(HttpResponse::json_body(&value)))
    }

    /// Queue a failure.
    pub fn push_error(self, error: TransportError) -> Self {
        self.push(Err(error))
    }

    /// Queue an arbitrary reply.
    pub fn push(self, reply: Result<HttpResponse, TransportError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Number of requests this transport has received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Snapshot of the recorded requests.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(request.clone());

        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return reply;
        }
        match &self.fallback {
            Fallback::EmptyJson => Ok(HttpResponse::json_body(&Value::Object(Default::default()))),
            Fallback::Responder(f) => f(&request),
        }
    }
}

// ---------------------------------------------------------------------------
// StaticParameters
// ---------------------------------------------------------------------------

/// Fixed parameter values, one JSON object per input item.
#[derive(Debug, Clone, Default)]
pub struct StaticParameters {
    items: Vec<HashMap<String, Value>>,
}

impl StaticParameters {
    /// Parameters for a single item, taken from a JSON object.
    pub fn single(params: Value) -> Self {
        Self::items(vec![params])
    }

    /// Parameters for several items.  Non-object values yield empty items.
    pub fn items(items: Vec<Value>) -> Self {
        let items = items
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map.into_iter().collect(),
                _ => HashMap::new(),
            })
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ParameterAccessor for StaticParameters {
    fn parameter(&self, name: &str, item_index: usize) -> Option<Value> {
        self.items.get(item_index)?.get(name).cloned()
    }
}

// ---------------------------------------------------------------------------
// MemoryBinary
// ---------------------------------------------------------------------------

/// In-memory attachments keyed by `(item_index, property)`.
#[derive(Debug, Clone, Default)]
pub struct MemoryBinary {
    files: HashMap<(usize, String), Vec<u8>>,
}

impl MemoryBinary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, item_index: usize, property: &str, data: impl Into<Vec<u8>>) -> Self {
        self.files.insert((item_index, property.to_owned()), data.into());
        self
    }
}

impl BinaryHelper for MemoryBinary {
    fn binary_data(&self, item_index: usize, property: &str) -> Option<Vec<u8>> {
        self.files.get(&(item_index, property.to_owned())).cloned()
    }
}

/// Build a context over the given doubles, one item per parameter set.
pub fn context<'a>(
    params: &'a StaticParameters,
    transport: &'a MockTransport,
    binary: &'a MemoryBinary,
    secrets: HashMap<String, String>,
) -> ExecutionContext<'a> {
    ExecutionContext {
        params,
        transport,
        binary,
        secrets,
        item_count: params.len(),
        continue_on_fail: false,
    }
}
