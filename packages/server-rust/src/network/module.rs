//! Network module with deferred startup lifecycle.
//!
//! `new()` allocates shared state, `start()` binds the TCP listener, and
//! `serve()` accepts connections until the shutdown future resolves. The
//! registry exists from `new()` on, so callers can inspect or seed it before
//! the server starts.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::{NetworkConfig, TlsConfig};
use super::handlers::{
    apply_operator_handler, create_stack_handler, delete_stack_handler, get_stack_handler,
    health_handler, list_operators_handler, list_stacks_handler, liveness_handler,
    push_value_handler, readiness_handler, AppState,
};
use super::middleware::apply_http_layers;
use super::openapi::openapi_handler;
use super::shutdown::ShutdownController;
use crate::service::{OperationDispatcher, ServerConfig};
use crate::storage::StackRegistry;

/// Assembles the router for every endpoint, with transport middleware.
///
/// Routes:
/// - `GET /rpn/op` -- operator tokens
/// - `POST /rpn/op/{op}/stack/{stack_id}` -- apply an operator
/// - `GET|POST /rpn/stack` -- list / create stacks
/// - `GET|POST|DELETE /rpn/stack/{stack_id}` -- read / push / delete
/// - `GET /health`, `/health/live`, `/health/ready` -- health checks
/// - `GET /openapi.json` -- API description
pub fn build_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    let routes = Router::new()
        .route("/rpn/op", get(list_operators_handler))
        .route("/rpn/op/{*tail}", post(apply_operator_handler))
        .route(
            "/rpn/stack",
            get(list_stacks_handler).post(create_stack_handler),
        )
        .route(
            "/rpn/stack/{stack_id}",
            get(get_stack_handler)
                .post(push_value_handler)
                .delete(delete_stack_handler),
        )
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/openapi.json", get(openapi_handler))
        .with_state(state);

    apply_http_layers(routes, &config)
}

/// Owns the HTTP server lifecycle and the process-wide stack registry.
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    registry: Arc<StackRegistry>,
    dispatcher: OperationDispatcher,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    /// Allocates the registry, operation pipeline, and shutdown controller
    /// without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, server_config: &ServerConfig) -> Self {
        let registry = Arc::new(StackRegistry::new());
        let dispatcher = OperationDispatcher::new(Arc::clone(&registry), server_config);
        Self {
            config,
            listener: None,
            registry,
            dispatcher,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    #[must_use]
    pub fn registry(&self) -> Arc<StackRegistry> {
        Arc::clone(&self.registry)
    }

    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    fn app_state(&self) -> AppState {
        AppState {
            dispatcher: self.dispatcher.clone(),
            registry: Arc::clone(&self.registry),
            shutdown: Arc::clone(&self.shutdown),
            config: Arc::new(self.config.clone()),
            start_time: Instant::now(),
        }
    }

    /// Builds the router over this module's shared state.
    pub fn router(&self) -> Router {
        build_router(self.app_state())
    }

    /// Binds the TCP listener and returns the bound port (useful with
    /// port 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let listener = TcpListener::bind(self.config.bind_address()).await?;
        let port = listener.local_addr()?.port();

        info!(host = %self.config.host, port, "TCP listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves until `shutdown` resolves or the controller's
    /// [`trigger_shutdown`](ShutdownController::trigger_shutdown) is called.
    ///
    /// Once shutdown starts the state is `Draining`, the listener stops
    /// accepting, and open connections get up to `drain_timeout` to finish
    /// before they are dropped. The state is `Stopped` when this returns.
    ///
    /// # Errors
    ///
    /// Returns an error on a fatal I/O error or unreadable TLS material.
    ///
    /// # Panics
    ///
    /// Panics if `start()` was not called before `serve()`.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .expect("start() must be called before serve()");
        let router = self.router();

        self.shutdown.set_ready();
        let relay = {
            let controller = Arc::clone(&self.shutdown);
            tokio::spawn(async move {
                shutdown.await;
                controller.trigger_shutdown();
            })
        };

        let drain_timeout = self.config.drain_timeout;
        let result = match self.config.tls.clone() {
            Some(tls) => serve_tls(listener, router, &tls, &self.shutdown, drain_timeout).await,
            None => serve_plain(listener, router, &self.shutdown, drain_timeout).await,
        };

        relay.abort();
        self.shutdown.mark_stopped();
        info!("server stopped");
        result
    }
}

async fn serve_plain(
    listener: TcpListener,
    router: Router,
    controller: &ShutdownController,
    drain_timeout: Duration,
) -> anyhow::Result<()> {
    info!("serving plain HTTP");

    let server = async {
        axum::serve(listener, router)
            .with_graceful_shutdown(controller.shutdown_signal())
            .await
    };
    let deadline = async {
        controller.shutdown_signal().await;
        tokio::time::sleep(drain_timeout).await;
    };

    tokio::select! {
        result = server => {
            result?;
            info!("all connections drained");
        }
        () = deadline => {
            warn!(
                ?drain_timeout,
                in_flight = controller.in_flight_count(),
                "drain timeout expired, dropping open connections"
            );
        }
    }
    Ok(())
}

/// Serves TLS via `axum-server` + rustls, reusing the pre-bound listener.
/// `axum-server` enforces the drain timeout itself.
async fn serve_tls(
    listener: TcpListener,
    router: Router,
    tls: &TlsConfig,
    controller: &ShutdownController,
    drain_timeout: Duration,
) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load TLS certificates: {e}"))?;

    let addr = listener.local_addr()?;
    let std_listener = listener.into_std()?;
    let handle = axum_server::Handle::new();

    let watcher = {
        let handle = handle.clone();
        let signal = controller.shutdown_signal();
        tokio::spawn(async move {
            signal.await;
            handle.graceful_shutdown(Some(drain_timeout));
        })
    };

    info!(%addr, "serving HTTPS");

    let result = axum_server::from_tcp_rustls(std_listener, rustls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await;
    watcher.abort();
    Ok(result?)
}
