//! Server-level configuration for the operation pipeline.

/// How an operator application commits its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CommitMode {
    /// Read, compute, replace. A write landing between the read and the
    /// replace on the same stack is overwritten (last writer wins).
    #[default]
    Relaxed,
    /// Read with version, compute, compare-and-swap. A stale commit fails
    /// with `ConcurrentModification` and leaves the stack untouched.
    Versioned,
}

/// Controls operation timeouts, concurrency limits, and commit semantics.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Default timeout for operations in milliseconds.
    pub default_operation_timeout_ms: u64,
    /// Maximum number of concurrent operations before load shedding.
    pub max_concurrent_operations: u32,
    /// Commit semantics for operator application.
    pub commit_mode: CommitMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_operation_timeout_ms: 5_000,
            max_concurrent_operations: 1000,
            commit_mode: CommitMode::Relaxed,
        }
    }
}
