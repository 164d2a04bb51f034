//! Operation pipeline.
//!
//! 1. **Operations** (`operation`): one typed variant per HTTP operation
//! 2. **Service** (`rpn`): executes operations against the stack registry
//! 3. **Middleware** (`middleware`): load shedding, timeout, metrics
//! 4. **Dispatcher** (`dispatcher`): stamps contexts and drives the pipeline

pub mod config;
pub mod dispatcher;
pub mod middleware;
pub mod operation;
pub mod rpn;

pub use config::{CommitMode, ServerConfig};
pub use dispatcher::OperationDispatcher;
pub use operation::{
    operation_names, Operation, OperationContext, OperationError, OperationResponse,
};
pub use rpn::RpnService;
