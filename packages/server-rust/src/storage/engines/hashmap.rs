//! In-memory [`StackStore`] backed by [`DashMap`].
//!
//! `DashMap` shards its entries behind per-shard locks, so writes to
//! different stacks proceed in parallel while writes to one stack are
//! serialized by the entry guard.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rpn_core::{StackId, Value};

use crate::storage::engine::{ReplaceOutcome, StackStore};
use crate::storage::record::StackRecord;

/// Concurrent in-memory stack storage.
pub struct HashMapStackStore {
    entries: DashMap<StackId, StackRecord>,
}

impl HashMapStackStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl Default for HashMapStackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StackStore for HashMapStackStore {
    fn insert_new(&self, id: StackId, record: StackRecord) -> bool {
        match self.entries.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    fn get(&self, id: &StackId) -> Option<StackRecord> {
        self.entries.get(id).map(|r| r.clone())
    }

    fn push(&self, id: &StackId, value: Value) -> Option<u64> {
        let mut record = self.entries.get_mut(id)?;
        record.contents.push(value);
        Some(record.bump())
    }

    fn replace(&self, id: &StackId, contents: Vec<Value>) -> Option<u64> {
        let mut record = self.entries.get_mut(id)?;
        record.contents = contents;
        Some(record.bump())
    }

    fn replace_if_version(
        &self,
        id: &StackId,
        expected: u64,
        contents: Vec<Value>,
    ) -> ReplaceOutcome {
        let Some(mut record) = self.entries.get_mut(id) else {
            return ReplaceOutcome::Missing;
        };
        if record.version != expected {
            return ReplaceOutcome::Stale(record.version);
        }
        record.contents = contents;
        ReplaceOutcome::Replaced(record.bump())
    }

    fn remove(&self, id: &StackId) -> Option<StackRecord> {
        self.entries.remove(id).map(|(_, r)| r)
    }

    fn snapshot(&self) -> Vec<(StackId, StackRecord)> {
        self.entries
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
