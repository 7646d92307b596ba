//! Variable snapshot diffing
//!
//! Decides which observed variables are eligible for recording and appends
//! deduplicated history to the lifecycle store: a new entry only when a
//! value differs from the last recorded one, `Initialized` on first sight
//! and `Changed` afterwards.

use std::collections::BTreeMap;

use crate::settings::{Settings, TrackSpec};
use crate::snapshot::Snapshot;
use crate::store::{ChangeEntry, FunctionRecord, LifecycleEntry, LifecycleStore};
use crate::types::{ChangeKind, Value};

/// Prefix marking private variables, always excluded from tracking
const PRIVATE_PREFIX: char = '_';

/// Snapshot differ - updates per-key change records from observed values
pub struct SnapshotDiffer;

impl SnapshotDiffer {
    /// Record the eligible variables of a snapshot into the key's record
    ///
    /// # Arguments
    /// * `store` - Lifecycle store holding the per-key records
    /// * `key` - Resolved tracking key of the observed scope
    /// * `class_name` - Enclosing type name, when the scope is a method
    /// * `snapshot` - Merged name-to-value view captured at the event
    /// * `settings` - Tracking configuration
    pub fn observe(
        store: &mut LifecycleStore,
        key: &str,
        class_name: Option<&str>,
        snapshot: &Snapshot,
        settings: &Settings,
    ) {
        let record = store.record_mut(key);
        for (name, value) in snapshot.iter() {
            if !Self::should_track(key, class_name, name, settings) {
                continue;
            }
            Self::record_value(record, name, value);
        }
    }

    /// Decide whether one variable of the scope is eligible for recording
    ///
    /// A variable is eligible when its name is admitted by the key's function
    /// spec or the class spec of the enclosing type, or when the respective
    /// filter map is not configured at all. Private names (underscore prefix)
    /// are never eligible, wildcards included.
    fn should_track(
        key: &str,
        class_name: Option<&str>,
        var_name: &str,
        settings: &Settings,
    ) -> bool {
        if var_name.starts_with(PRIVATE_PREFIX) {
            return false;
        }

        spec_allows(&settings.track_functions, Some(key), var_name)
            || spec_allows(&settings.track_classes, class_name, var_name)
            || (class_name.is_some() && settings.track_classes.is_empty())
            || settings.track_functions.is_empty()
    }

    /// Append one observation, deduplicating against the last recorded value
    fn record_value(record: &mut FunctionRecord, name: &str, value: &Value) {
        let history = record.lifecycle.entry(name.to_string()).or_default();
        let kind = match history.last() {
            Some(last) if last.value == *value => return,
            Some(_) => ChangeKind::Changed,
            None => ChangeKind::Initialized,
        };

        history.push(LifecycleEntry {
            kind,
            value: value.clone(),
        });
        record.changes.push(ChangeEntry {
            variable: name.to_string(),
            kind,
            value: value.clone(),
        });
    }
}

/// Wildcard-or-membership check against one tracking map
fn spec_allows(
    specs: &BTreeMap<String, TrackSpec>,
    key: Option<&str>,
    var_name: &str,
) -> bool {
    match key {
        Some(key) => specs.get(key).map(|s| s.allows(var_name)).unwrap_or(false),
        None => false,
    }
}
