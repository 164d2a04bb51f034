//! Stack registry: identifier generation and error mapping on top of a
//! [`StackStore`].

use std::collections::HashMap;
use std::sync::Arc;

use rpn_core::{RpnError, StackId, Value};
use tracing::debug;

use super::engine::{ReplaceOutcome, StackStore};
use super::engines::HashMapStackStore;
use super::record::StackRecord;

/// Owner of every stack in the process.
///
/// Cheap to share behind an `Arc`; all methods take `&self`. Each call is
/// atomic for the id it touches, but a caller doing `get` followed by
/// `replace` is not: a push landing in between is overwritten by the
/// replace. Use [`StackRegistry::get_versioned`] together with
/// [`StackRegistry::replace_if_version`] to detect that case.
pub struct StackRegistry {
    store: Arc<dyn StackStore>,
}

impl StackRegistry {
    /// Creates a registry over the default in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Arc::new(HashMapStackStore::new()))
    }

    /// Creates a registry over a caller-provided store.
    #[must_use]
    pub fn with_store(store: Arc<dyn StackStore>) -> Self {
        Self { store }
    }

    /// Stores `initial` verbatim under a fresh id and returns both.
    pub fn create(&self, initial: Vec<Value>) -> (StackId, Vec<Value>) {
        let record = StackRecord::new(initial);
        let contents = record.contents.clone();
        loop {
            let id = StackId::new();
            if self.store.insert_new(id, record.clone()) {
                debug!(stack_id = %id, depth = contents.len(), "stack created");
                self.record_gauge();
                return (id, contents);
            }
        }
    }

    /// Snapshot of every stack. No ordering across ids.
    #[must_use]
    pub fn list(&self) -> HashMap<StackId, Vec<Value>> {
        self.store
            .snapshot()
            .into_iter()
            .map(|(id, record)| (id, record.contents))
            .collect()
    }

    /// Current contents of a stack.
    ///
    /// # Errors
    ///
    /// [`RpnError::StackNotFound`] if no stack has this id.
    pub fn get(&self, id: &StackId) -> Result<Vec<Value>, RpnError> {
        self.get_versioned(id).map(|(contents, _)| contents)
    }

    /// Current contents of a stack together with its version.
    ///
    /// # Errors
    ///
    /// [`RpnError::StackNotFound`] if no stack has this id.
    pub fn get_versioned(&self, id: &StackId) -> Result<(Vec<Value>, u64), RpnError> {
        self.store
            .get(id)
            .map(|record| (record.contents, record.version))
            .ok_or_else(|| RpnError::not_found(id))
    }

    /// Appends `value` as the new top of the stack.
    ///
    /// # Errors
    ///
    /// [`RpnError::StackNotFound`] if no stack has this id.
    pub fn push(&self, id: &StackId, value: Value) -> Result<(), RpnError> {
        let version = self
            .store
            .push(id, value)
            .ok_or_else(|| RpnError::not_found(id))?;
        debug!(stack_id = %id, version, "value pushed");
        Ok(())
    }

    /// Swaps the stack's whole contents.
    ///
    /// # Errors
    ///
    /// [`RpnError::StackNotFound`] if no stack has this id.
    pub fn replace(&self, id: &StackId, contents: Vec<Value>) -> Result<(), RpnError> {
        let version = self
            .store
            .replace(id, contents)
            .ok_or_else(|| RpnError::not_found(id))?;
        debug!(stack_id = %id, version, "stack replaced");
        Ok(())
    }

    /// Swaps the stack's whole contents if nobody wrote to it since
    /// `expected` was read.
    ///
    /// # Errors
    ///
    /// - [`RpnError::StackNotFound`] if no stack has this id
    /// - [`RpnError::ConcurrentModification`] if the version moved on
    pub fn replace_if_version(
        &self,
        id: &StackId,
        expected: u64,
        contents: Vec<Value>,
    ) -> Result<(), RpnError> {
        match self.store.replace_if_version(id, expected, contents) {
            ReplaceOutcome::Replaced(version) => {
                debug!(stack_id = %id, version, "stack replaced");
                Ok(())
            }
            ReplaceOutcome::Stale(current) => {
                debug!(stack_id = %id, expected, current, "stale commit rejected");
                Err(RpnError::ConcurrentModification { id: id.to_string() })
            }
            ReplaceOutcome::Missing => Err(RpnError::not_found(id)),
        }
    }

    /// Removes the stack.
    ///
    /// # Errors
    ///
    /// [`RpnError::StackNotFound`] if no stack has this id.
    pub fn delete(&self, id: &StackId) -> Result<(), RpnError> {
        self.store
            .remove(id)
            .ok_or_else(|| RpnError::not_found(id))?;
        debug!(stack_id = %id, "stack deleted");
        self.record_gauge();
        Ok(())
    }

    /// Number of stacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when no stack exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    #[allow(clippy::cast_precision_loss)]
    fn record_gauge(&self) {
        metrics::gauge!("rpn_stacks").set(self.store.len() as f64);
    }
}

impl Default for StackRegistry {
    fn default() -> Self {
        Self::new()
    }
}
