//! Pipeline composition: wraps the [`RpnService`] in every middleware layer
//! and erases the resulting type.

use tower::util::BoxCloneSyncService;
use tower::ServiceBuilder;

use super::load_shed::LoadShedLayer;
use super::metrics::MetricsLayer;
use super::timeout::TimeoutLayer;
use crate::service::config::ServerConfig;
use crate::service::operation::{Operation, OperationError, OperationResponse};
use crate::service::rpn::RpnService;

/// Type-erased, cloneable, shareable operation pipeline.
///
/// Cloning is cheap: clones share the load-shedding semaphore and the
/// registry behind the innermost service.
pub type OperationPipeline = BoxCloneSyncService<Operation, OperationResponse, OperationError>;

/// Builds the operation pipeline.
///
/// Layer order (outermost to innermost):
/// 1. `LoadShedLayer` -- reject when overloaded before doing any work
/// 2. `TimeoutLayer` -- enforce the per-operation deadline, capped by the
///    configured default
/// 3. `MetricsLayer` -- span, timing and outcome, closest to the handler
#[must_use]
pub fn build_operation_pipeline(service: RpnService, config: &ServerConfig) -> OperationPipeline {
    let stack = ServiceBuilder::new()
        .layer(LoadShedLayer::new(config.max_concurrent_operations))
        .layer(TimeoutLayer::new(config.default_operation_timeout_ms))
        .layer(MetricsLayer)
        .service(service);
    BoxCloneSyncService::new(stack)
}
