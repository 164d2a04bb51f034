//! HTTP handlers for the RPN server.
//!
//! Defines [`AppState`], the shared state every handler extracts, and
//! re-exports the handler functions used to build the router.

pub mod error;
pub mod health;
pub mod operators;
pub mod stacks;

pub use error::{ApiError, JsonBody, MessageBody};
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use operators::{apply_operator_handler, list_operators_handler};
pub use stacks::{
    create_stack_handler, delete_stack_handler, get_stack_handler, list_stacks_handler,
    push_value_handler,
};

use std::sync::Arc;
use std::time::Instant;

use super::{NetworkConfig, ShutdownController};
use crate::service::{Operation, OperationDispatcher, OperationError, OperationResponse};
use crate::storage::StackRegistry;

/// Shared state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc`s and a cloneable dispatcher, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Runs operations through the middleware pipeline.
    pub dispatcher: OperationDispatcher,
    /// The registry behind the dispatcher, read directly by health checks.
    pub registry: Arc<StackRegistry>,
    /// Health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Network configuration.
    pub config: Arc<NetworkConfig>,
    /// Process start, for uptime.
    pub start_time: Instant,
}

impl AppState {
    /// Dispatches `op`, counting it as in flight until it completes.
    pub(crate) async fn run(&self, op: Operation) -> Result<OperationResponse, ApiError> {
        let _guard = self.shutdown.in_flight_guard();
        Ok(self.dispatcher.dispatch(op).await?)
    }
}

/// Error for a response variant the handler did not ask for.
pub(crate) fn unexpected(resp: &OperationResponse) -> ApiError {
    ApiError::from(OperationError::Internal(anyhow::anyhow!(
        "unexpected operation response: {resp:?}"
    )))
}
