//! Load-shedding middleware.
//!
//! Operations take a permit from a shared pool before reaching the
//! calculator. When the pool is empty the operation fails immediately with
//! [`OperationError::Overloaded`] instead of queueing. The number of permits
//! held is published as the `rpn_operations_in_flight` gauge.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tower::{Layer, Service};
use tracing::warn;

use crate::service::operation::{Operation, OperationError, OperationResponse};

// ---------------------------------------------------------------------------
// Admission
// ---------------------------------------------------------------------------

/// Fixed-size permit pool shared by every clone of the layer and service.
#[derive(Debug)]
struct Admission {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl Admission {
    fn admit(&self) -> Option<OwnedSemaphorePermit> {
        let permit = Arc::clone(&self.permits).try_acquire_owned().ok()?;
        self.publish();
        Some(permit)
    }

    fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    #[allow(clippy::cast_precision_loss)]
    fn publish(&self) {
        metrics::gauge!("rpn_operations_in_flight").set(self.in_flight() as f64);
    }
}

// ---------------------------------------------------------------------------
// LoadShedLayer
// ---------------------------------------------------------------------------

/// Tower layer admitting at most `capacity` concurrent operations.
#[derive(Debug, Clone)]
pub struct LoadShedLayer {
    admission: Arc<Admission>,
}

impl LoadShedLayer {
    /// `capacity` is normally `ServerConfig::max_concurrent_operations`.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        let capacity = capacity as usize;
        Self {
            admission: Arc::new(Admission {
                permits: Arc::new(Semaphore::new(capacity)),
                capacity,
            }),
        }
    }

    /// Operations currently holding a permit.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.admission.in_flight()
    }
}

impl<S> Layer<S> for LoadShedLayer {
    type Service = LoadShedService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoadShedService {
            inner,
            admission: Arc::clone(&self.admission),
        }
    }
}

// ---------------------------------------------------------------------------
// LoadShedService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadShedService<S> {
    inner: S,
    admission: Arc<Admission>,
}

impl<S> Service<Operation> for LoadShedService<S>
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
        let Some(permit) = self.admission.admit() else {
            warn!(
                operation = op.ctx().name,
                call_id = op.ctx().call_id,
                capacity = self.admission.capacity,
                "operation shed"
            );
            return Box::pin(async { Err(OperationError::Overloaded) });
        };

        let admission = Arc::clone(&self.admission);
        let fut = self.inner.call(op);
        Box::pin(async move {
            let result = fut.await;
            drop(permit);
            admission.publish();
            result
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
