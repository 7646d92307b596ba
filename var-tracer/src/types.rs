//! Core types for the variable tracing engine
//!
//! This module defines the value model shared by every component: the closed
//! set of diffable values, the change and event classifications, and the
//! engine error type. Opaque objects have no representation here on purpose -
//! a receiver contributes its fields through the `Inspect` capability instead
//! of being stored as a value itself.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, TraceError>;

/// Errors that can occur inside the tracing engine
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Failed to parse settings document: {0}")]
    SettingsParse(#[from] serde_json::Error),

    #[error("Receiver introspection failed: {0}")]
    Inspect(#[from] InspectError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to read the fields of a receiver object
#[derive(Debug, Clone, thiserror::Error)]
#[error("cannot introspect receiver: {message}")]
pub struct InspectError {
    message: String,
}

impl InspectError {
    /// Create an introspection error with a descriptive message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The class of event reported by an instrumentation site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A function body was entered
    Call,
    /// A statement inside a function body executed
    Line,
    /// A function is about to return
    Return,
}

/// How a variable's recorded history was extended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// First value ever observed for the variable under its tracking key
    Initialized,
    /// The value differs from the last recorded one
    Changed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Initialized => write!(f, "Initialized"),
            ChangeKind::Changed => write!(f, "Changed"),
        }
    }
}

/// A diffable value captured from a traced scope
///
/// Only scalar and structural values can be recorded. Collections nest
/// arbitrarily; set-like collections are captured in sorted order so that
/// equality between two captures is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Signed integer value
    Int(i64),
    /// Floating-point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Text value
    Text(String),
    /// Byte-sequence value
    Bytes(Vec<u8>),
    /// Ordered sequence of values
    Seq(Vec<Value>),
    /// Name-keyed mapping of values
    Map(BTreeMap<String, Value>),
    /// Set-like collection, captured in sorted order
    Set(Vec<Value>),
}

impl Value {
    /// Build a byte-sequence value
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(data.into())
    }

    /// Convert to f64 if the value is numeric or boolean
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Convert to i64 if the value is numeric or boolean
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) => Some(*v as i64),
            Value::Bool(v) => Some(if *v { 1 } else { 0 }),
            _ => None,
        }
    }

    /// Interpret the value as a boolean (numbers are true when nonzero)
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(v) => *v,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Text(v) => !v.is_empty(),
            Value::Bytes(v) => !v.is_empty(),
            Value::Seq(v) => !v.is_empty(),
            Value::Map(v) => !v.is_empty(),
            Value::Set(v) => !v.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Bytes(v) => {
                write!(f, "0x")?;
                for byte in v {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Value::Seq(items) => write_items(f, items, "[", "]"),
            Value::Set(items) => write_items(f, items, "{", "}"),
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (name, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value], open: &str, close: &str) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Ord> From<BTreeSet<T>> for Value {
    fn from(items: BTreeSet<T>) -> Self {
        Value::Set(items.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(entries: BTreeMap<String, V>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
