//! Variable Lifecycle Tracing Engine
//!
//! An in-process execution tracer: instrumented code reports call/line/return
//! events, the engine decides which functions are of interest, snapshots the
//! variables visible at each event, and keeps a deduplicated change history
//! per function that is rendered when the function returns.
//!
//! # Architecture
//!
//! - Settings decide which scopes and variables to track, loaded from a JSON
//!   document with per-field defaults
//! - The key resolver maps a traced scope to its tracking key
//! - The snapshot differ appends deduplicated history per variable
//! - The event dispatcher runs the per-event pipeline: filter, resolve,
//!   diff, emit
//! - Sinks render emitted records as a grid table or a per-variable listing
//! - The runtime installs the engine per thread behind an RAII guard
//!
//! The engine does NOT:
//! - Persist traces across processes or runs
//! - Instrument foreign or native code
//! - Measure timing or memory
//! - Act as a debugger
//!
//! # Example Usage
//!
//! ```
//! use var_tracer::{runtime, snapshot, Settings, TrackSpec};
//!
//! // Track only `total` inside `restock`, everything else stays quiet
//! let settings = Settings::new().track_function("restock", TrackSpec::names(["total"]));
//! let _guard = runtime::start(settings);
//!
//! // Instrumentation calls placed at function boundaries:
//! let mut total = 0i64;
//! runtime::on_call(module_path!(), file!(), "restock", None, snapshot! { total = total });
//! total += 12;
//! runtime::on_return(module_path!(), file!(), "restock", None, snapshot! { total = total });
//! ```

// Public modules
pub mod differ;
pub mod dispatcher;
pub mod resolver;
pub mod runtime;
pub mod settings;
pub mod sink;
pub mod snapshot;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use differ::SnapshotDiffer;
pub use dispatcher::EventDispatcher;
pub use resolver::KeyResolver;
pub use settings::{Settings, TrackSpec};
pub use sink::{sink_for, LifecyclePrinter, OutputSink, TablePrinter};
pub use snapshot::{Inspect, ScopeEvent, Snapshot};
pub use store::{ChangeEntry, FunctionRecord, LifecycleEntry, LifecycleStore};
pub use types::{ChangeKind, EventKind, InspectError, Result, TraceError, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
