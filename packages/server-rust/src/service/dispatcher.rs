//! Entry point used by HTTP handlers to run operations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tower::ServiceExt;

use super::config::ServerConfig;
use super::middleware::{build_operation_pipeline, OperationPipeline};
use super::operation::{Operation, OperationContext, OperationError, OperationResponse};
use super::rpn::RpnService;
use crate::storage::StackRegistry;

/// Stamps operation contexts and drives them through the pipeline.
///
/// Clones share the call-id counter and the pipeline.
#[derive(Clone)]
pub struct OperationDispatcher {
    pipeline: OperationPipeline,
    call_ids: Arc<AtomicU64>,
    call_timeout_ms: u64,
}

impl OperationDispatcher {
    /// Builds the full pipeline over `registry`.
    #[must_use]
    pub fn new(registry: Arc<StackRegistry>, config: &ServerConfig) -> Self {
        let service = RpnService::new(registry, config.commit_mode);
        Self {
            pipeline: build_operation_pipeline(service, config),
            call_ids: Arc::new(AtomicU64::new(1)),
            call_timeout_ms: config.default_operation_timeout_ms,
        }
    }

    /// Fresh context with the next call id and the default timeout.
    #[must_use]
    pub fn context(&self, name: &'static str) -> OperationContext {
        let call_id = self.call_ids.fetch_add(1, Ordering::Relaxed);
        OperationContext::new(call_id, name, self.call_timeout_ms)
    }

    /// Runs one operation to completion.
    ///
    /// # Errors
    ///
    /// Whatever the pipeline returns: domain errors, timeouts, or load
    /// shedding.
    pub async fn dispatch(&self, op: Operation) -> Result<OperationResponse, OperationError> {
        self.pipeline.clone().oneshot(op).await
    }
}
