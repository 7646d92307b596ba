//! Per-function change records and the lifecycle store
//!
//! A [`FunctionRecord`] accumulates everything observed under one tracking
//! key, in two parallel views: an ordered history per variable and a flat
//! chronological log across all variables. Records are created lazily on
//! first observation and drained from the store when emitted.

use std::collections::{BTreeMap, HashMap};

use crate::types::{ChangeKind, Value};

/// One step in a variable's recorded history
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleEntry {
    /// Whether this entry initialized the variable or changed it
    pub kind: ChangeKind,
    /// The value observed at this step
    pub value: Value,
}

/// One entry of the flat chronological change log
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEntry {
    /// Variable the entry belongs to
    pub variable: String,
    /// Whether this entry initialized the variable or changed it
    pub kind: ChangeKind,
    /// The value observed at this step
    pub value: Value,
}

/// Cumulative change record for one tracking key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionRecord {
    /// Ordered history per variable, keyed by variable name
    pub lifecycle: BTreeMap<String, Vec<LifecycleEntry>>,
    /// Flat chronological log interleaving all variables of the key
    pub changes: Vec<ChangeEntry>,
}

impl FunctionRecord {
    /// True if nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Store of function records, indexed by tracking key
#[derive(Debug, Default)]
pub struct LifecycleStore {
    records: HashMap<String, FunctionRecord>,
}

impl LifecycleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for a key, created lazily on first access
    pub fn record_mut(&mut self, key: &str) -> &mut FunctionRecord {
        self.records.entry(key.to_string()).or_default()
    }

    /// Look up a key's record without creating it
    pub fn get(&self, key: &str) -> Option<&FunctionRecord> {
        self.records.get(key)
    }

    /// Remove and return a key's record
    ///
    /// Emission drains the store through this: after a record is printed its
    /// key starts over from an empty record.
    pub fn take(&mut self, key: &str) -> Option<FunctionRecord> {
        self.records.remove(key)
    }

    /// Number of keys currently held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no key holds a record
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_record_creation() {
        let mut store = LifecycleStore::new();
        assert!(store.get("restock").is_none());

        store.record_mut("restock").changes.push(ChangeEntry {
            variable: "total".to_string(),
            kind: ChangeKind::Initialized,
            value: Value::Int(5),
        });

        assert_eq!(store.len(), 1);
        assert!(!store.get("restock").unwrap().is_empty());
    }

    #[test]
    fn test_take_drains_the_key() {
        let mut store = LifecycleStore::new();
        store.record_mut("restock");

        let record = store.take("restock");
        assert!(record.is_some());
        assert!(store.is_empty());
        assert!(store.take("restock").is_none());
    }
}
