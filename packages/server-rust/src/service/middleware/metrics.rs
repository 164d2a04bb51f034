//! Operation instrumentation.
//!
//! Wraps each call in an `operation` tracing span and records
//! `rpn_operations_total{operation,outcome}` and
//! `rpn_operation_duration_seconds{operation}` through the `metrics` facade.
//! Without an installed recorder the metric calls are no-ops.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service};
use tracing::{debug, info_span, Instrument};

use crate::service::operation::{Operation, OperationError, OperationResponse};

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments every operation it wraps.
///
/// Sits innermost in the pipeline, so recorded durations cover only the
/// calculator itself, not time spent waiting on admission.
#[derive(Debug, Clone)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

/// Service half of [`MetricsLayer`].
#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

/// Label value for the `outcome` dimension.
fn outcome(result: &Result<OperationResponse, OperationError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(OperationError::Rpn(_)) => "rejected",
        Err(OperationError::Timeout { .. }) => "timeout",
        Err(OperationError::Overloaded) => "overloaded",
        Err(OperationError::Internal(_)) => "error",
    }
}

impl<S> Service<Operation> for MetricsService<S>
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
        let name = op.ctx().name;
        let call_id = op.ctx().call_id;

        let span = info_span!(
            "operation",
            operation = name,
            call_id = call_id,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(op);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;
                let elapsed = start.elapsed();
                let outcome = outcome(&result);

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = elapsed.as_millis() as u64;
                let span = tracing::Span::current();
                span.record("duration_ms", duration_ms);
                span.record("outcome", outcome);

                metrics::counter!("rpn_operations_total", "operation" => name, "outcome" => outcome)
                    .increment(1);
                metrics::histogram!("rpn_operation_duration_seconds", "operation" => name)
                    .record(elapsed.as_secs_f64());

                if let Err(err) = &result {
                    debug!(error = %err, "operation failed");
                }

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rpn_core::RpnError;
    use tower::ServiceExt;

    use super::*;
    use crate::service::middleware::test_support::{list_op, DelayService};

    #[tokio::test]
    async fn passes_response_through() {
        let svc = MetricsLayer.layer(DelayService { delay_ms: 0 });
        let resp = svc.oneshot(list_op(1_000)).await.unwrap();
        assert_eq!(resp, OperationResponse::Deleted);
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(outcome(&Ok(OperationResponse::Deleted)), "ok");
        assert_eq!(outcome(&Err(RpnError::DivisionByZero.into())), "rejected");
        assert_eq!(outcome(&Err(OperationError::Overloaded)), "overloaded");
        assert_eq!(outcome(&Err(OperationError::Timeout { timeout_ms: 1 })), "timeout");
        assert_eq!(
            outcome(&Err(OperationError::Internal(anyhow::anyhow!("boom")))),
            "error"
        );
    }
}
