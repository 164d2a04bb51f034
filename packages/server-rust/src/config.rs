//! Command-line and environment configuration.
//!
//! Every flag has an `RPN_*` environment fallback. [`ServerArgs`] is split
//! into the transport-level [`NetworkConfig`] and the pipeline-level
//! [`ServerConfig`].

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::network::{NetworkConfig, TlsConfig};
use crate::service::{CommitMode, ServerConfig};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// RPN calculator HTTP server.
#[derive(Debug, Clone, Parser)]
#[command(name = "rpn-server", version, about)]
pub struct ServerArgs {
    /// Address to bind.
    #[arg(long, env = "RPN_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on (0 = OS-assigned).
    #[arg(long, env = "RPN_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Allowed CORS origins; `*` allows any.
    #[arg(
        long = "cors-origin",
        env = "RPN_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    pub cors_origins: Vec<String>,

    /// Upper bound on HTTP request handling, in seconds.
    #[arg(long, env = "RPN_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Upper bound on a single operation, in milliseconds.
    #[arg(long, env = "RPN_OPERATION_TIMEOUT_MS", default_value_t = 5_000)]
    pub operation_timeout_ms: u64,

    /// Operations allowed in flight before new ones are shed.
    #[arg(long, env = "RPN_MAX_CONCURRENT_OPERATIONS", default_value_t = 1000)]
    pub max_concurrent_operations: u32,

    /// How operator results are committed.
    #[arg(long, env = "RPN_COMMIT_MODE", value_enum, default_value_t = CommitMode::Relaxed)]
    pub commit_mode: CommitMode,

    /// Log output format.
    #[arg(long, env = "RPN_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Port for the Prometheus scrape endpoint. Disabled when unset.
    #[arg(long, env = "RPN_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// PEM certificate chain; requires `--tls-key`.
    #[arg(long, env = "RPN_TLS_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key; requires `--tls-cert`.
    #[arg(long, env = "RPN_TLS_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,

    /// Time allowed for in-flight requests after shutdown starts, in seconds.
    #[arg(long, env = "RPN_DRAIN_TIMEOUT_SECS", default_value_t = 30)]
    pub drain_timeout_secs: u64,
}

impl ServerArgs {
    /// Transport configuration.
    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            tls: TlsConfig::from_pair(self.tls_cert.clone(), self.tls_key.clone()),
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
        }
    }

    /// Operation pipeline configuration.
    #[must_use]
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            default_operation_timeout_ms: self.operation_timeout_ms,
            max_concurrent_operations: self.max_concurrent_operations,
            commit_mode: self.commit_mode,
        }
    }
}
