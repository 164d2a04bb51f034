//! Transport settings for the RPN server: where to listen, whether to
//! terminate TLS, which browser origins may call the API, and how long
//! requests and shutdown draining may take.

use std::path::PathBuf;
use std::time::Duration;

/// Transport-level configuration. [`Default`] listens on `0.0.0.0` with an
/// OS-assigned port over plain HTTP.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub host: String,
    /// `0` asks the OS for a free port; `NetworkModule::start` reports it.
    pub port: u16,
    pub tls: Option<TlsConfig>,
    /// Origins allowed by CORS. A `"*"` entry allows any origin.
    pub cors_origins: Vec<String>,
    /// Deadline for one HTTP request, answered with 408 when exceeded.
    pub request_timeout: Duration,
    /// How long open connections may keep running after shutdown starts.
    pub drain_timeout: Duration,
}

impl NetworkConfig {
    /// `host:port` as handed to the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }

    /// `https` when TLS is configured.
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        if self.tls.is_some() {
            "https"
        } else {
            "http"
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            tls: None,
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            drain_timeout: Duration::from_secs(30),
        }
    }
}

/// PEM certificate chain and private key for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

impl TlsConfig {
    /// TLS is on only when both halves are present.
    #[must_use]
    pub fn from_pair(cert_path: Option<PathBuf>, key_path: Option<PathBuf>) -> Option<Self> {
        Some(Self {
            cert_path: cert_path?,
            key_path: key_path?,
        })
    }
}
