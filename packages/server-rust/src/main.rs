//! `rpn-server` binary: parses configuration, installs logging and metrics,
//! and runs the HTTP server until Ctrl-C or SIGTERM.

use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use rpn_server::logging::init_tracing;
use rpn_server::{NetworkModule, ServerArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    init_tracing(args.log_format)?;

    if let Some(port) = args.metrics_port {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()?;
        info!(port, "Prometheus exporter listening");
    }

    info!(
        version = rpn_server::VERSION,
        commit_mode = ?args.commit_mode,
        "starting RPN server"
    );

    let mut module = NetworkModule::new(args.network_config(), &args.server_config());
    let port = module.start().await?;
    info!(port, "ready to accept connections");

    module.serve(shutdown_signal()).await?;

    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
