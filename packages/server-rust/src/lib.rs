//! RPN Server -- HTTP calculator over named stacks of JSON values.

pub mod config;
pub mod logging;
pub mod network;
pub mod service;
pub mod storage;

pub use config::{LogFormat, ServerArgs};
pub use network::{build_router, NetworkModule};
pub use service::{CommitMode, ServerConfig};
pub use storage::StackRegistry;

/// Crate version, reported at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
