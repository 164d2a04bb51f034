//! RPN core: the value model, operator set, error taxonomy, and the pure
//! operator engine shared by the server.

pub mod engine;
pub mod error;
pub mod operator;
pub mod types;

pub use engine::apply;
pub use error::RpnError;
pub use operator::Operator;
pub use types::{Number, StackId, Value};
