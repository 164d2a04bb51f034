//! Lifecycle state and the shutdown signal.
//!
//! Health checks read [`HealthState`] from an `ArcSwap` without locking. Shutdown
//! is broadcast on a `watch` channel: the server's graceful-shutdown future
//! and its drain deadline both subscribe to it, so the moment shutdown is
//! triggered `/health/ready` reports `draining` and the listener stops
//! accepting.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;
use tracing::info;

/// Server lifecycle: `Starting -> Ready -> Draining -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Listener not yet serving.
    Starting,
    Ready,
    /// Shutdown triggered; open connections are finishing.
    Draining,
    /// The server returned.
    Stopped,
}

impl HealthState {
    /// Lowercase name used in health bodies.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

/// Shared by the handlers (state, in-flight count) and the server loop
/// (shutdown signal).
#[derive(Debug)]
pub struct ShutdownController {
    triggered: watch::Sender<bool>,
    in_flight: Arc<AtomicU64>,
    state: ArcSwap<HealthState>,
}

impl ShutdownController {
    #[must_use]
    pub fn new() -> Self {
        let (triggered, _) = watch::channel(false);
        Self {
            triggered,
            in_flight: Arc::new(AtomicU64::new(0)),
            state: ArcSwap::from_pointee(HealthState::Starting),
        }
    }

    pub fn set_ready(&self) {
        self.state.store(Arc::new(HealthState::Ready));
    }

    /// Moves to `Draining` and wakes every [`shutdown_signal`] future.
    /// Later calls are no-ops.
    ///
    /// [`shutdown_signal`]: Self::shutdown_signal
    pub fn trigger_shutdown(&self) {
        let first = self
            .triggered
            .send_if_modified(|triggered| !std::mem::replace(triggered, true));
        if first {
            self.state.store(Arc::new(HealthState::Draining));
            info!(in_flight = self.in_flight_count(), "shutdown triggered, draining");
        }
    }

    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        *self.triggered.borrow()
    }

    /// Resolves once [`trigger_shutdown`](Self::trigger_shutdown) has been
    /// called, immediately if it already was. The future owns its
    /// subscription, so it can be handed to a spawned task or to
    /// `with_graceful_shutdown`.
    pub fn shutdown_signal(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.triggered.subscribe();
        async move {
            // The sender lives as long as the controller; a closed channel
            // means nobody is left to wait for.
            let _ = rx.wait_for(|triggered| *triggered).await;
        }
    }

    /// Final state once the server has returned.
    pub fn mark_stopped(&self) {
        self.state.store(Arc::new(HealthState::Stopped));
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.state.load()
    }

    /// Counts an operation as in flight until the guard drops.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn lifecycle_transitions() {
        let controller = ShutdownController::new();
        assert_eq!(controller.health_state(), HealthState::Starting);

        controller.set_ready();
        assert_eq!(controller.health_state(), HealthState::Ready);
        assert!(!controller.is_shutting_down());

        controller.trigger_shutdown();
        assert_eq!(controller.health_state(), HealthState::Draining);
        assert!(controller.is_shutting_down());

        controller.mark_stopped();
        assert_eq!(controller.health_state(), HealthState::Stopped);
        assert_eq!(HealthState::Stopped.as_str(), "stopped");
    }

    #[test]
    fn repeated_trigger_does_not_undo_stopped() {
        let controller = ShutdownController::new();
        controller.trigger_shutdown();
        controller.mark_stopped();
        controller.trigger_shutdown();
        assert_eq!(controller.health_state(), HealthState::Stopped);
    }

    #[test]
    fn guards_track_in_flight_operations() {
        let controller = ShutdownController::new();
        let first = controller.in_flight_guard();
        let second = controller.in_flight_guard();
        assert_eq!(controller.in_flight_count(), 2);

        drop(first);
        assert_eq!(controller.in_flight_count(), 1);
        drop(second);
        assert_eq!(controller.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn signal_waits_for_trigger() {
        let controller = Arc::new(ShutdownController::new());
        let waiter = tokio::spawn(controller.shutdown_signal());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        controller.trigger_shutdown();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn signal_created_after_trigger_resolves_immediately() {
        let controller = ShutdownController::new();
        controller.trigger_shutdown();
        tokio::time::timeout(Duration::from_millis(100), controller.shutdown_signal())
            .await
            .unwrap();
    }
}
