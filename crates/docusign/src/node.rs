//! `DocuSignNode` — the [`ExecutableNode`] the host registers.

use async_trait::async_trait;
use nodes::{ExecutableNode, ExecutionContext, NodeError, OutputRecord};
use tracing::{info, instrument, warn};

use crate::config::{DocuSignCredentials, NodeConfig};
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::params::ItemParams;
use crate::retry::{is_rate_limit_error, retry_after_or};

pub const NODE_TYPE: &str = "docusign";

/// Runs one DocuSign operation per input item.
///
/// `resource` and `operation` are read per item alongside the operation's
/// own parameters, so one batch may mix operations.
#[derive(Debug, Clone, Default)]
pub struct DocuSignNode {
    config: NodeConfig,
}

impl DocuSignNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    async fn run_item(&self, dispatcher: &Dispatcher<'_>, params: ItemParams<'_>) -> Result<Vec<OutputRecord>> {
        let resource = params.required("resource")?;
        let operation = params.required("operation")?;
        dispatcher.execute(&resource, &operation, params).await
    }
}

#[async_trait]
impl ExecutableNode for DocuSignNode {
    #[instrument(skip(self, ctx), fields(items = ctx.item_count))]
    async fn execute(&self, ctx: &ExecutionContext<'_>) -> std::result::Result<Vec<OutputRecord>, NodeError> {
        let credentials = DocuSignCredentials::from_secrets(&ctx.secrets)?;
        let dispatcher = Dispatcher::new(&credentials, ctx.transport, ctx.binary, &self.config);

        let mut output = Vec::new();
        let mut failed = 0usize;
        for index in 0..ctx.item_count {
            let params = ItemParams::new(ctx.params, index);
            match self.run_item(&dispatcher, params).await {
                Ok(records) => output.extend(records),
                Err(e) if ctx.continue_on_fail => {
                    warn!(item = index, "item failed, continuing: {e}");
                    failed += 1;
                    output.push(OutputRecord::error(e.to_string(), index));
                }
                Err(e) => {
                    if is_rate_limit_error(&e) {
                        let wait = retry_after_or(&e, self.config.retry_after_fallback);
                        warn!(item = index, retry_after_secs = wait, "rate limited by DocuSign");
                        return Err(NodeError::Retryable(format!("{e} (retry after {wait}s)")));
                    }
                    return Err(e.into());
                }
            }
        }

        info!(records = output.len(), failed, "DocuSign node finished");
        Ok(output)
    }
}
