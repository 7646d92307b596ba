//! Execution event dispatching
//!
//! The dispatcher is the single entry point invoked for every traced event.
//! It filters events by source scope, resolves a tracking key, feeds the
//! snapshot differ, and emits a function's record when the function returns.
//! A failure while handling one event is logged and dropped; tracing always
//! stays installed for the rest of the program.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::differ::SnapshotDiffer;
use crate::resolver::KeyResolver;
use crate::settings::Settings;
use crate::sink::OutputSink;
use crate::snapshot::{ScopeEvent, Snapshot};
use crate::store::LifecycleStore;
use crate::types::{EventKind, Result};

/// Source-path substrings always excluded from tracing
///
/// These mark code the host program links in but does not own: registry and
/// git checkouts, toolchain sources, build-script output.
const SKIP_PATHS: &[&str] = &[
    "cargo/registry",
    "cargo/git",
    "rustup/toolchains",
    "/library/std",
    "/library/core",
    "target/debug/build",
    "target/release/build",
];

/// Framework lifecycle hooks excluded to avoid tracing request plumbing
const HOOK_BLACKLIST: &[&str] = &["dispatch", "middleware", "get_response"];

/// The per-event state machine driving resolution, diffing and emission
pub struct EventDispatcher {
    settings: Settings,
    store: LifecycleStore,
    sink: Box<dyn OutputSink>,
}

impl EventDispatcher {
    /// Create a dispatcher with the given settings and output sink
    pub fn new(settings: Settings, sink: Box<dyn OutputSink>) -> Self {
        Self {
            settings,
            store: LifecycleStore::new(),
            sink,
        }
    }

    /// Process one traced event
    ///
    /// Never unwinds into the caller: errors and panics raised while
    /// handling the event are logged with context and swallowed.
    pub fn dispatch(&mut self, event: &ScopeEvent<'_>) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.process(event)));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::error!("Error in variable tracking: {}", e),
            Err(_) => log::error!(
                "Panic while tracking '{}' - event dropped",
                event.function
            ),
        }
    }

    fn process(&mut self, event: &ScopeEvent<'_>) -> Result<()> {
        if self.should_skip(event.source_file) {
            return Ok(());
        }

        // Extract context: file stem, "."-separated module name, type name
        let file_name = file_stem(event.source_file);
        let module_name = event.module_path.replace("::", ".");
        let class_name = event.receiver.map(|r| r.type_name());

        // Skip framework lifecycle hooks entirely
        if HOOK_BLACKLIST
            .iter()
            .any(|name| event.function.contains(name))
        {
            return Ok(());
        }

        let key = match KeyResolver::resolve(
            &module_name,
            file_name,
            event.function,
            class_name,
            &self.settings,
        ) {
            Some(key) => key,
            None => return Ok(()),
        };
        log::trace!("Tracking {:?} event under key '{}'", event.kind, key);

        let snapshot = Snapshot::merged(&event.locals, event.receiver);
        SnapshotDiffer::observe(&mut self.store, &key, class_name, &snapshot, &self.settings);

        // Pop-on-print: emission drains the key's record from the store
        if event.kind == EventKind::Return {
            if let Some(record) = self.store.take(&key) {
                self.sink.print(&record, &key)?;
            }
        }

        Ok(())
    }

    /// True if a source path lies outside the traced scope
    fn should_skip(&self, filename: &str) -> bool {
        if !filename.contains(&self.settings.module_scope) {
            return true;
        }
        SKIP_PATHS.iter().any(|path| filename.contains(path))
    }

    /// The tracking configuration this dispatcher was built with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Records accumulated so far, readable after `stop` returns the engine
    pub fn store(&self) -> &LifecycleStore {
        &self.store
    }
}

/// Stem of a source file path, used as the file component of tracking keys
fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("")
}
