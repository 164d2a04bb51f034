//! Record type held by a [`StackStore`](super::StackStore).

use rpn_core::Value;

/// A stack's contents (last element = top) and its write version.
///
/// The version starts at 1 and grows by one on every push or replace; the
/// versioned commit mode compares it to detect interleaved writes.
#[derive(Debug, Clone, PartialEq)]
pub struct StackRecord {
    pub contents: Vec<Value>,
    pub version: u64,
}

impl StackRecord {
    #[must_use]
    pub fn new(contents: Vec<Value>) -> Self {
        Self {
            contents,
            version: 1,
        }
    }

    /// Records a write and returns the new version.
    pub fn bump(&mut self) -> u64 {
        self.version = self.version.saturating_add(1);
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_at_version_one() {
        let record = StackRecord::new(vec![Value::from(1)]);
        assert_eq!(record.contents, vec![Value::from(1)]);
        assert_eq!(record.version, 1);
    }

    #[test]
    fn bump_counts_writes() {
        let mut record = StackRecord::new(Vec::new());
        assert_eq!(record.bump(), 2);
        assert_eq!(record.bump(), 3);
        assert_eq!(record.version, 3);
    }
}
