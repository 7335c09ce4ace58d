//! The `ExecutableNode` trait and the host seams it is executed against.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{BinaryData, HttpRequest, HttpResponse, OutputRecord};
use crate::{NodeError, TransportError};

/// Per-item parameter lookup supplied by the host.
///
/// Returns `None` when the parameter is not set for that item; callers
/// apply their own defaults.
pub trait ParameterAccessor: Send + Sync {
    fn parameter(&self, name: &str, item_index: usize) -> Option<Value>;
}

/// Authenticated HTTP round trip supplied by the host.
///
/// Implementations attach credentials and must report every non-2xx
/// response as a [`TransportError`] carrying its status.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Access to binary attachments travelling with the input items.
pub trait BinaryHelper: Send + Sync {
    /// Raw bytes of the attachment stored under `property` on item `item_index`.
    fn binary_data(&self, item_index: usize, property: &str) -> Option<Vec<u8>>;

    /// Wrap downloaded bytes in the host's attachment representation.
    fn prepare_binary(&self, data: &[u8], file_name: &str, mime_type: &str) -> BinaryData {
        BinaryData::from_bytes(data, file_name, mime_type)
    }
}

/// Everything a node needs from the host for one execution.
///
/// Defined here (in the nodes crate) so hosts and node implementations can
/// share it without depending on each other.
pub struct ExecutionContext<'a> {
    pub params: &'a dyn ParameterAccessor,
    pub transport: &'a dyn HttpTransport,
    pub binary: &'a dyn BinaryHelper,
    /// Decrypted credential fields scoped to this node.
    pub secrets: HashMap<String, String>,
    /// Number of input items; the node runs once per item.
    pub item_count: usize,
    /// Capture per-item failures as error records instead of aborting.
    pub continue_on_fail: bool,
}

/// The core node trait.
///
/// All built-in nodes must implement this.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Execute the node over every input item and return its output records.
    async fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<Vec<OutputRecord>, NodeError>;
}
