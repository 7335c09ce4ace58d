//! `nodes` crate — the `ExecutableNode` trait and the host seams nodes run against.
//!
//! Every node must implement [`ExecutableNode`].  The host supplies the
//! collaborators bundled in [`ExecutionContext`]: per-item parameters, an
//! authenticated [`HttpTransport`], and [`BinaryHelper`] access to attachments.

pub mod error;
pub mod models;
pub mod traits;
pub mod transport;
pub mod mock;

pub use error::{NodeError, TransportError};
pub use models::{BinaryData, HttpMethod, HttpRequest, HttpResponse, OutputRecord};
pub use traits::{BinaryHelper, ExecutableNode, ExecutionContext, HttpTransport, ParameterAccessor};
pub use transport::ReqwestTransport;
