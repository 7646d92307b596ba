//! Scope snapshots and receiver introspection
//!
//! A [`Snapshot`] is the ephemeral name-to-value view captured at one traced
//! event. When the event belongs to a method, the receiver's own fields are
//! merged on top of the local scope; a receiver that cannot be introspected
//! simply contributes nothing for that event.

use std::fmt;

use crate::types::{EventKind, InspectError, Value};

/// Capability for a type to expose its fields to the tracer
///
/// Implementing this trait opts a type into field-level tracking when it
/// appears as the receiver of an instrumented method.
pub trait Inspect {
    /// Name of the concrete type, used as the class component of tracking keys
    fn type_name(&self) -> &str;

    /// Current name-to-value view of the fields
    fn fields(&self) -> std::result::Result<Vec<(String, Value)>, InspectError>;
}

/// Ordered name-to-value mapping captured at one traced event
///
/// Insertion order is preserved; setting an existing name overwrites its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: Vec<(String, Value)>,
}

impl Snapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, overwriting in place if the name is already present
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Number of captured variables
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was captured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over captured (name, value) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Merge local variables with the receiver's fields
    ///
    /// The receiver wins name collisions, matching how an instance attribute
    /// shadows a same-named local in the merged view. A receiver whose
    /// [`Inspect::fields`] fails contributes nothing; local variables are
    /// unaffected by the failure.
    pub fn merged(locals: &Snapshot, receiver: Option<&dyn Inspect>) -> Snapshot {
        let mut snapshot = locals.clone();
        if let Some(receiver) = receiver {
            match receiver.fields() {
                Ok(fields) => {
                    for (name, value) in fields {
                        snapshot.set(name, value);
                    }
                }
                Err(e) => {
                    log::debug!("Skipping fields of {}: {}", receiver.type_name(), e);
                }
            }
        }
        snapshot
    }
}

/// One traced event as reported by an instrumentation site
///
/// This is the engine's only window into the running program: the source
/// location identifying the scope, the event class, the local variables
/// captured at the site, and the method receiver when there is one.
pub struct ScopeEvent<'a> {
    /// Event class reported by the site
    pub kind: EventKind,
    /// Module path of the site, "::"-separated as `module_path!` produces it
    pub module_path: &'a str,
    /// Source file path of the site, as `file!` produces it
    pub source_file: &'a str,
    /// Name of the enclosing function
    pub function: &'a str,
    /// Method receiver, when the function is bound to one
    pub receiver: Option<&'a dyn Inspect>,
    /// Local variables captured at the site
    pub locals: Snapshot,
}

impl<'a> ScopeEvent<'a> {
    /// Create an event with no receiver and no locals
    pub fn new(
        kind: EventKind,
        module_path: &'a str,
        source_file: &'a str,
        function: &'a str,
    ) -> Self {
        Self {
            kind,
            module_path,
            source_file,
            function,
            receiver: None,
            locals: Snapshot::new(),
        }
    }

    /// Builder method: attach the method receiver
    pub fn with_receiver(mut self, receiver: &'a dyn Inspect) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Builder method: attach the captured locals
    pub fn with_locals(mut self, locals: Snapshot) -> Self {
        self.locals = locals;
        self
    }
}

impl fmt::Debug for ScopeEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeEvent")
            .field("kind", &self.kind)
            .field("module_path", &self.module_path)
            .field("source_file", &self.source_file)
            .field("function", &self.function)
            .field("receiver", &self.receiver.map(|r| r.type_name()))
            .field("locals", &self.locals)
            .finish()
    }
}

/// Capture local variables into a [`Snapshot`]
///
/// Each `name = expr` entry records the expression's value under the given
/// name, converting through [`Value::from`].
///
/// # Example
/// ```
/// use var_tracer::{snapshot, Value};
///
/// let total = 17i64;
/// let snap = snapshot! { total = total, done = false };
/// assert_eq!(snap.get("total"), Some(&Value::Int(17)));
/// ```
#[macro_export]
macro_rules! snapshot {
    () => {
        $crate::Snapshot::new()
    };
    ($($name:ident = $value:expr),+ $(,)?) => {{
        let mut snap = $crate::Snapshot::new();
        $(snap.set(stringify!($name), $crate::Value::from($value));)+
        snap
    }};
}
