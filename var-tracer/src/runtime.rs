//! Runtime installation of the tracing engine
//!
//! Tracing is confined to the installing thread: each thread owns at most
//! one dispatcher, held in thread-local storage, so no synchronization is
//! needed between traced threads. Instrumented code reports events through
//! [`observe`] or the per-event probes, all of which are no-ops whenever
//! tracing is not installed.
//!
//! ## Usage
//!
//! ```
//! use var_tracer::{runtime, snapshot, Settings};
//!
//! let _guard = runtime::start(Settings::default());
//!
//! // Inside an instrumented function body:
//! let total = 3i64;
//! runtime::on_call(module_path!(), file!(), "restock", None, snapshot! { total = total });
//! runtime::on_return(module_path!(), file!(), "restock", None, snapshot! { total = total + 1 });
//! ```

use std::cell::RefCell;

use crate::dispatcher::EventDispatcher;
use crate::settings::Settings;
use crate::sink;
use crate::snapshot::{Inspect, ScopeEvent, Snapshot};
use crate::types::EventKind;

thread_local! {
    /// Dispatcher for the current thread, when tracing is installed
    static DISPATCHER: RefCell<Option<EventDispatcher>> = const { RefCell::new(None) };
}

/// Install tracing for the current thread and return the releasing guard
///
/// The sink is chosen from the settings. Dropping the guard uninstalls
/// tracing again.
pub fn start(settings: Settings) -> TraceGuard {
    log::info!("Tracker started with settings: {:?}", settings);
    let sink = sink::sink_for(&settings);
    install(EventDispatcher::new(settings, sink));
    TraceGuard { _private: () }
}

/// Install a pre-built dispatcher for the current thread
///
/// An already-installed dispatcher is replaced and dropped together with
/// its store; call [`stop`] first to keep it.
pub fn install(dispatcher: EventDispatcher) {
    DISPATCHER.with(|slot| {
        *slot.borrow_mut() = Some(dispatcher);
    });
}

/// Uninstall tracing for the current thread
///
/// Returns the engine, and with it the records it still holds, so a caller
/// can inspect what never got emitted.
pub fn stop() -> Option<EventDispatcher> {
    let dispatcher = DISPATCHER.with(|slot| slot.borrow_mut().take());
    if dispatcher.is_some() {
        log::info!("Tracker stopped.");
    }
    dispatcher
}

/// True if tracing is installed for the current thread
pub fn is_active() -> bool {
    DISPATCHER.with(|slot| slot.borrow().is_some())
}

/// Report one traced event to the installed dispatcher
///
/// Does nothing without an installed dispatcher. An event reported while an
/// earlier event of this thread is still being processed (for example from
/// code a sink invokes) is dropped rather than processed re-entrantly.
pub fn observe(event: &ScopeEvent<'_>) {
    DISPATCHER.with(|slot| {
        if let Ok(mut slot) = slot.try_borrow_mut() {
            if let Some(dispatcher) = slot.as_mut() {
                dispatcher.dispatch(event);
            }
        }
    });
}

/// Report a function-entry event
pub fn on_call(
    module_path: &str,
    source_file: &str,
    function: &str,
    receiver: Option<&dyn Inspect>,
    locals: Snapshot,
) {
    observe_kind(EventKind::Call, module_path, source_file, function, receiver, locals);
}

/// Report an in-body event
pub fn on_line(
    module_path: &str,
    source_file: &str,
    function: &str,
    receiver: Option<&dyn Inspect>,
    locals: Snapshot,
) {
    observe_kind(EventKind::Line, module_path, source_file, function, receiver, locals);
}

/// Report a function-exit event
///
/// This is the event class that triggers emission of the function's record.
pub fn on_return(
    module_path: &str,
    source_file: &str,
    function: &str,
    receiver: Option<&dyn Inspect>,
    locals: Snapshot,
) {
    observe_kind(EventKind::Return, module_path, source_file, function, receiver, locals);
}

fn observe_kind(
    kind: EventKind,
    module_path: &str,
    source_file: &str,
    function: &str,
    receiver: Option<&dyn Inspect>,
    locals: Snapshot,
) {
    let mut event = ScopeEvent::new(kind, module_path, source_file, function).with_locals(locals);
    if let Some(receiver) = receiver {
        event = event.with_receiver(receiver);
    }
    observe(&event);
}

/// Guard that keeps tracing installed until dropped
///
/// Returned by [`start`]; replaces ambient global installation with scoped
/// acquisition and guaranteed release.
pub struct TraceGuard {
    _private: (),
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_and_stop() {
        assert!(!is_active());
        install(EventDispatcher::new(
            Settings::default(),
            sink::sink_for(&Settings::default()),
        ));
        assert!(is_active());

        let dispatcher = stop();
        assert!(dispatcher.is_some());
        assert!(!is_active());
        assert!(stop().is_none());
    }

    #[test]
    fn test_guard_uninstalls_on_drop() {
        {
            let _guard = start(Settings::default());
            assert!(is_active());
        }
        assert!(!is_active());
    }

    #[test]
    fn test_observe_without_installation_is_noop() {
        // Must not panic or install anything
        on_call(module_path!(), file!(), "orphan", None, Snapshot::new());
        assert!(!is_active());
    }

    #[test]
    fn test_events_reach_the_installed_dispatcher() {
        let _guard = start(Settings::default());

        let mut locals = Snapshot::new();
        locals.set("count", crate::types::Value::Int(1));
        on_call(module_path!(), file!(), "sample", None, locals);

        let dispatcher = stop().unwrap();
        assert!(dispatcher.store().get("sample").is_some());
    }
}
