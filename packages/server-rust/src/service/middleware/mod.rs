//! Tower middleware layers for the operation pipeline.
//!
//! - [`load_shed`]: semaphore-based concurrency limiting
//! - [`timeout`]: per-operation deadline
//! - [`metrics`]: tracing span plus `metrics` counters and histograms
//! - [`pipeline`]: composes the layers around the [`RpnService`](super::RpnService)

pub mod load_shed;
pub mod metrics;
pub mod pipeline;
pub mod timeout;

pub use self::load_shed::LoadShedLayer;
pub use self::metrics::MetricsLayer;
pub use self::pipeline::{build_operation_pipeline, OperationPipeline};
pub use self::timeout::TimeoutLayer;
