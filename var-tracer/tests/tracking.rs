//! End-to-end tracing tests driven through the public runtime surface

use std::cell::RefCell;
use std::rc::Rc;

use var_tracer::{
    runtime, snapshot, ChangeKind, EventDispatcher, FunctionRecord, Inspect, InspectError,
    OutputSink, ScopeEvent, Settings, Snapshot, TrackSpec, Value,
};

/// Sink that captures emitted records instead of printing them
#[derive(Clone, Default)]
struct CaptureSink {
    emitted: Rc<RefCell<Vec<(String, FunctionRecord)>>>,
}

impl OutputSink for CaptureSink {
    fn print(&mut self, record: &FunctionRecord, key: &str) -> var_tracer::Result<()> {
        self.emitted
            .borrow_mut()
            .push((key.to_string(), record.clone()));
        Ok(())
    }
}

/// Demo receiver with an introspection failure switch
struct Turnstile {
    entries: i64,
    locked: bool,
    sealed: bool,
}

impl Inspect for Turnstile {
    fn type_name(&self) -> &str {
        "Turnstile"
    }

    fn fields(&self) -> Result<Vec<(String, Value)>, InspectError> {
        if self.sealed {
            return Err(InspectError::new("turnstile is sealed"));
        }
        Ok(vec![
            ("entries".to_string(), Value::Int(self.entries)),
            ("locked".to_string(), Value::Bool(self.locked)),
            ("_service_code".to_string(), Value::Int(999)),
        ])
    }
}

/// Settings whose scope matches this test file's path
fn test_settings() -> Settings {
    Settings::new().with_module_scope("tests")
}

fn install_capture(settings: Settings) -> Rc<RefCell<Vec<(String, FunctionRecord)>>> {
    let sink = CaptureSink::default();
    let emitted = sink.emitted.clone();
    runtime::install(EventDispatcher::new(settings, Box::new(sink)));
    emitted
}

/// An instrumented free function: accumulates units into a total
fn restock_order(units: &[i64]) -> i64 {
    runtime::on_call(module_path!(), file!(), "restock_order", None, snapshot! {});
    let mut total = 0i64;
    let mut batches = 0i64;
    for unit in units {
        total += unit;
        batches += 1;
        runtime::on_line(
            module_path!(),
            file!(),
            "restock_order",
            None,
            snapshot! { total = total, batches = batches },
        );
    }
    runtime::on_return(
        module_path!(),
        file!(),
        "restock_order",
        None,
        snapshot! { total = total, batches = batches },
    );
    total
}

/// An instrumented method: pushes the receiver through the tracer
fn admit(turnstile: &mut Turnstile, attempt: i64) -> bool {
    runtime::on_call(
        module_path!(),
        file!(),
        "admit",
        Some(&*turnstile),
        snapshot! { attempt = attempt },
    );
    let granted = !turnstile.locked;
    if granted {
        turnstile.entries += 1;
    }
    runtime::on_return(
        module_path!(),
        file!(),
        "admit",
        Some(&*turnstile),
        snapshot! { attempt = attempt, granted = granted },
    );
    granted
}

#[test]
fn traced_function_end_to_end() {
    let emitted = install_capture(test_settings());

    let total = restock_order(&[5, 5, 12]);
    assert_eq!(total, 22);

    let records = emitted.borrow();
    assert_eq!(records.len(), 1);
    let (key, record) = &records[0];
    assert_eq!(key, "restock_order");

    // total: 5 -> 10 -> 22, deduplicated across the repeated batch of 5
    let history = &record.lifecycle["total"];
    let values: Vec<&Value> = history.iter().map(|e| &e.value).collect();
    assert_eq!(values, vec![&Value::Int(5), &Value::Int(10), &Value::Int(22)]);
    assert_eq!(history[0].kind, ChangeKind::Initialized);
    assert!(history[1..].iter().all(|e| e.kind == ChangeKind::Changed));

    // batches: 1 -> 2 -> 3
    assert_eq!(record.lifecycle["batches"].len(), 3);

    drop(records);
    runtime::stop();
}

#[test]
fn emission_drains_and_next_call_reinitializes() {
    let emitted = install_capture(test_settings());

    restock_order(&[7]);
    restock_order(&[7]);

    let records = emitted.borrow();
    assert_eq!(records.len(), 2);
    for (_, record) in records.iter() {
        // Same values again, but the first emission took the dedup baseline
        // with it, so the second run re-initializes
        assert_eq!(record.lifecycle["total"].len(), 1);
        assert_eq!(record.lifecycle["total"][0].kind, ChangeKind::Initialized);
    }

    drop(records);
    runtime::stop();
}

#[test]
fn receiver_fields_merge_and_private_names_stay_out() {
    let emitted = install_capture(test_settings());

    let mut turnstile = Turnstile {
        entries: 0,
        locked: false,
        sealed: false,
    };
    admit(&mut turnstile, 1);

    let records = emitted.borrow();
    let (key, record) = &records[0];
    assert_eq!(key, "admit");

    // Locals and receiver fields both present
    assert!(record.lifecycle.contains_key("attempt"));
    assert!(record.lifecycle.contains_key("entries"));
    assert!(record.lifecycle.contains_key("locked"));
    // Private receiver field never tracked
    assert!(!record.lifecycle.contains_key("_service_code"));

    // entries: 0 at call, 1 at return
    let entries: Vec<&Value> = record.lifecycle["entries"].iter().map(|e| &e.value).collect();
    assert_eq!(entries, vec![&Value::Int(0), &Value::Int(1)]);

    drop(records);
    runtime::stop();
}

#[test]
fn function_and_class_specs_combine() {
    // With both filter maps configured, a variable needs an explicit grant:
    // `granted` through the function spec, `entries` through the class spec
    let settings = test_settings()
        .track_function("admit", TrackSpec::names(["granted"]))
        .track_class("Turnstile", TrackSpec::names(["entries"]));
    let emitted = install_capture(settings);

    let mut turnstile = Turnstile {
        entries: 3,
        locked: true,
        sealed: false,
    };
    admit(&mut turnstile, 1);

    let records = emitted.borrow();
    let (key, record) = &records[0];
    assert_eq!(key, "admit");
    assert!(record.lifecycle.contains_key("granted"));
    assert!(record.lifecycle.contains_key("entries"));
    assert!(!record.lifecycle.contains_key("locked"));
    assert!(!record.lifecycle.contains_key("attempt"));

    drop(records);
    runtime::stop();
}

#[test]
fn sealed_receiver_degrades_to_locals_only() {
    let emitted = install_capture(test_settings());

    let mut turnstile = Turnstile {
        entries: 0,
        locked: false,
        sealed: true,
    };
    admit(&mut turnstile, 2);

    let records = emitted.borrow();
    let (_, record) = &records[0];
    // Locals survive the introspection failure, fields do not appear
    assert!(record.lifecycle.contains_key("attempt"));
    assert!(!record.lifecycle.contains_key("entries"));

    drop(records);
    runtime::stop();
}

#[test]
fn out_of_scope_events_never_reach_the_store() {
    let settings = Settings::new().with_module_scope("no-such-marker");
    let emitted = install_capture(settings);

    restock_order(&[1, 2, 3]);

    assert!(emitted.borrow().is_empty());
    let dispatcher = runtime::stop().unwrap();
    assert!(dispatcher.store().is_empty());
}

#[test]
fn reentrant_events_from_a_sink_are_dropped() {
    /// Sink that reports a fresh event while printing
    struct ReentrantSink;

    impl OutputSink for ReentrantSink {
        fn print(&mut self, _record: &FunctionRecord, _key: &str) -> var_tracer::Result<()> {
            runtime::on_call(module_path!(), file!(), "from_sink", None, snapshot! {});
            Ok(())
        }
    }

    runtime::install(EventDispatcher::new(
        test_settings(),
        Box::new(ReentrantSink),
    ));

    // Must not panic on the nested observe during emission
    restock_order(&[4]);

    let dispatcher = runtime::stop().unwrap();
    // The nested event was dropped, not recorded
    assert!(dispatcher.store().get("from_sink").is_none());
}

#[test]
fn events_without_installation_are_noops() {
    // Nothing installed on this test thread
    let event = ScopeEvent::new(
        var_tracer::EventKind::Return,
        module_path!(),
        file!(),
        "orphan",
    )
    .with_locals(Snapshot::new());
    runtime::observe(&event);
    assert!(!runtime::is_active());
}

mod settings_documents {
    use super::*;
    use std::fs;

    #[test]
    fn partial_document_merges_field_by_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"module_scope": "app"}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.module_scope, "app");
        assert!(settings.track_functions.is_empty());
        assert!(settings.track_classes.is_empty());
        assert!(!settings.print_table);
        assert!(settings.print_lifecycle);
    }

    #[test]
    fn full_document_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
                "module_scope": "app",
                "track_functions": {"restock_order": ["total"], "checkout": "*"},
                "track_classes": {"Turnstile": "*"},
                "print_table": true,
                "print_lifecycle": false
            }"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(
            settings.track_functions["restock_order"],
            TrackSpec::names(["total"])
        );
        assert_eq!(settings.track_functions["checkout"], TrackSpec::all());
        assert_eq!(settings.track_classes["Turnstile"], TrackSpec::all());
        assert!(settings.print_table);
        assert!(!settings.print_lifecycle);
    }

    #[test]
    fn malformed_document_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let settings = Settings::load_or_default(&path);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn missing_document_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_or_default(&dir.path().join("absent.json"));
        assert_eq!(settings, Settings::default());
    }
}
