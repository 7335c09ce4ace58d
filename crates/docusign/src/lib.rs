//! `docusign` crate — a workflow node for the DocuSign eSignature REST API (v2.1).
//!
//! Input items are validated, shaped into DocuSign requests, sent through
//! the host's authenticated transport and turned back into output records.
//! The host seams live in the `nodes` crate.

pub mod builders;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod node;
pub mod pagination;
pub mod params;
pub mod resources;
pub mod retry;
pub mod validators;

pub use config::{get_base_url, DocuSignCredentials, Environment, NodeConfig, Region};
pub use dispatcher::{Dispatcher, OperationPlan, RequestEnvelope, ResponseShape};
pub use error::{DocuSignError, Result};
pub use node::{DocuSignNode, NODE_TYPE};
pub use pagination::{paginate, Page, PageCursor, PaginationOptions};
pub use resources::{Operation, Resource};
pub use retry::{is_rate_limit_error, is_retryable_error, retry_after_seconds};

#[cfg(test)]
mod dispatcher_tests;
