//! Deadline middleware for operations.
//!
//! Each operation carries its own budget in `ctx.call_timeout_ms`. The layer
//! clamps that budget to a server-wide ceiling, so a caller can ask for less
//! time than the configured default but never more. A budget of `0` means
//! "use the ceiling".

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tower::{Layer, Service};
use tracing::warn;

use crate::service::operation::{Operation, OperationError, OperationResponse};

// ---------------------------------------------------------------------------
// TimeoutLayer
// ---------------------------------------------------------------------------

/// Tower layer enforcing per-operation deadlines under a ceiling.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutLayer {
    ceiling_ms: u64,
}

impl TimeoutLayer {
    /// `ceiling_ms` is normally `ServerConfig::default_operation_timeout_ms`.
    #[must_use]
    pub fn new(ceiling_ms: u64) -> Self {
        Self { ceiling_ms }
    }

    /// Budget actually granted to an operation that asked for `requested_ms`.
    #[must_use]
    pub fn effective_timeout_ms(&self, requested_ms: u64) -> u64 {
        match requested_ms {
            0 => self.ceiling_ms,
            ms => ms.min(self.ceiling_ms),
        }
    }
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService { inner, layer: *self }
    }
}

// ---------------------------------------------------------------------------
// TimeoutService
// ---------------------------------------------------------------------------

/// Service half of [`TimeoutLayer`].
#[derive(Debug, Clone)]
pub struct TimeoutService<S> {
    inner: S,
    layer: TimeoutLayer,
}

impl<S> Service<Operation> for TimeoutService<S>
where
    S: Service<Operation, Response = OperationResponse, Error = OperationError> + Send,
    S::Future: Send + 'static,
{
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = Pin<Box<dyn Future<Output = Result<OperationResponse, OperationError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let ctx = op.ctx();
        let (name, call_id) = (ctx.name, ctx.call_id);
        let timeout_ms = self.layer.effective_timeout_ms(ctx.call_timeout_ms);

        let fut = self.inner.call(op);
        Box::pin(async move {
            if let Ok(result) = tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
                result
            } else {
                warn!(operation = name, call_id, timeout_ms, "operation deadline exceeded");
                Err(OperationError::Timeout { timeout_ms })
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tower::ServiceExt;

    use super::*;
    use crate::service::middleware::test_support::{list_op, DelayService};

    #[test]
    fn budget_is_clamped_to_ceiling() {
        let layer = TimeoutLayer::new(1_000);
        assert_eq!(layer.effective_timeout_ms(0), 1_000);
        assert_eq!(layer.effective_timeout_ms(250), 250);
        assert_eq!(layer.effective_timeout_ms(60_000), 1_000);
    }

    #[tokio::test]
    async fn completes_within_deadline() {
        let svc = TimeoutLayer::new(1_000).layer(DelayService { delay_ms: 10 });
        let resp = svc.oneshot(list_op(1_000)).await.unwrap();
        assert_eq!(resp, OperationResponse::Deleted);
    }

    #[tokio::test]
    async fn exceeding_requested_budget_times_out() {
        let svc = TimeoutLayer::new(1_000).layer(DelayService { delay_ms: 200 });
        let err = svc.oneshot(list_op(50)).await.unwrap_err();
        assert!(matches!(err, OperationError::Timeout { timeout_ms: 50 }));
    }

    #[tokio::test]
    async fn ceiling_overrides_a_larger_request() {
        let svc = TimeoutLayer::new(30).layer(DelayService { delay_ms: 200 });
        let err = svc.oneshot(list_op(10_000)).await.unwrap_err();
        assert!(matches!(err, OperationError::Timeout { timeout_ms: 30 }));
    }
}
