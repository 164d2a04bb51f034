//! In-memory stack storage.
//!
//! - [`StackStore`]: low-level concurrent map from id to record
//! - [`HashMapStackStore`]: the `DashMap`-backed store
//! - [`StackRegistry`]: id generation and `RpnError` mapping, shared by the
//!   request handlers

pub mod engine;
pub mod engines;
pub mod record;
pub mod registry;

pub use engine::{ReplaceOutcome, StackStore};
pub use engines::HashMapStackStore;
pub use record::StackRecord;
pub use registry::StackRegistry;
