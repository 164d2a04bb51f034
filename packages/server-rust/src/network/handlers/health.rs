//! Health, liveness, and readiness endpoints for orchestrators and load
//! balancers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use super::{AppState, MessageBody};
use crate::network::HealthState;

/// Body of `GET /health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    /// `starting`, `ready`, `draining` or `stopped`.
    pub state: String,
    /// Stacks currently held.
    pub stacks: usize,
    /// Requests currently being handled.
    pub in_flight: u64,
    pub uptime_secs: u64,
}

/// Detailed health. Always 200; `state` carries the lifecycle state.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Process health", body = HealthReport)),
    tag = "health"
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        state: state.shutdown.health_state().as_str().to_string(),
        stacks: state.registry.len(),
        in_flight: state.shutdown.in_flight_count(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Liveness check: the process is up and answering.
#[utoipa::path(
    get,
    path = "/health/live",
    responses((status = 200, description = "Process is up")),
    tag = "health"
)]
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Readiness check: 200 only while `Ready`; 503 while starting, draining,
/// or stopped. The message names the state either way.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Accepting traffic", body = MessageBody),
        (status = 503, description = "Not accepting traffic", body = MessageBody),
    ),
    tag = "health"
)]
pub async fn readiness_handler(State(state): State<AppState>) -> (StatusCode, Json<MessageBody>) {
    let health = state.shutdown.health_state();
    let status = if health == HealthState::Ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(MessageBody::new(health.as_str())))
}

#[cfg(test)]
mod tests {
    use rpn_core::Value;

    use super::*;
    use crate::network::handlers::test_support::test_state;

    #[tokio::test]
    async fn health_reports_state_and_stack_count() {
        let state = test_state();
        state.shutdown.set_ready();
        state.registry.create(vec![Value::from(1)]);
        let _guard = state.shutdown.in_flight_guard();

        let report = health_handler(State(state)).await.0;
        assert_eq!(report.state, "ready");
        assert_eq!(report.stacks, 1);
        assert_eq!(report.in_flight, 1);
    }

    #[tokio::test]
    async fn health_reports_starting_before_ready() {
        let report = health_handler(State(test_state())).await.0;
        assert_eq!(report.state, "starting");
    }

    #[tokio::test]
    async fn liveness_is_always_ok() {
        assert_eq!(liveness_handler().await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_follows_health_state() {
        let state = test_state();
        let (status, body) = readiness_handler(State(state.clone())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.0.message, "starting");

        state.shutdown.set_ready();
        assert_eq!(readiness_handler(State(state.clone())).await.0, StatusCode::OK);

        state.shutdown.trigger_shutdown();
        let (status, body) = readiness_handler(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.0.message, "draining");
    }
}
