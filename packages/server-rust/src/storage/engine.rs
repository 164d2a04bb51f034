//! Low-level stack storage trait.
//!
//! [`StackStore`] is the innermost storage layer: a concurrent map from
//! [`StackId`] to [`StackRecord`]. Every method is a single atomic step with
//! respect to the id it touches; there is no multi-call transaction.

use rpn_core::{StackId, Value};

use super::record::StackRecord;

/// Outcome of a versioned replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The contents were swapped; carries the new version.
    Replaced(u64),
    /// The stored version did not match; carries the current version.
    Stale(u64),
    /// No stack under that id.
    Missing,
}

/// In-memory stack storage shared across request tasks.
///
/// Wrapped in `Arc<dyn StackStore>` by the [`StackRegistry`](super::StackRegistry).
/// Writes to different ids must not block each other; writes to the same id
/// are serialized.
pub trait StackStore: Send + Sync + 'static {
    /// Inserts `record` under `id` unless the id is taken.
    ///
    /// Returns `false` and leaves the store untouched on collision.
    fn insert_new(&self, id: StackId, record: StackRecord) -> bool;

    /// Clones the record stored under `id`.
    fn get(&self, id: &StackId) -> Option<StackRecord>;

    /// Appends `value` to the stack. Returns the new version.
    fn push(&self, id: &StackId, value: Value) -> Option<u64>;

    /// Swaps the whole contents. Returns the new version.
    fn replace(&self, id: &StackId, contents: Vec<Value>) -> Option<u64>;

    /// Swaps the whole contents only if the stored version equals `expected`.
    fn replace_if_version(
        &self,
        id: &StackId,
        expected: u64,
        contents: Vec<Value>,
    ) -> ReplaceOutcome;

    /// Removes the stack, returning its last record.
    fn remove(&self, id: &StackId) -> Option<StackRecord>;

    /// Point-in-time copy of every stack. Concurrent writes do not fail it.
    fn snapshot(&self) -> Vec<(StackId, StackRecord)>;

    /// Number of stacks.
    fn len(&self) -> usize;

    /// True when no stack exists.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
