//! Tracking configuration
//!
//! Settings are loaded once from a JSON document and stay immutable for the
//! lifetime of the engine. Every field falls back to its own default
//! independently, so a partial document is merged field-wise rather than
//! rejected. A missing or malformed document yields the full defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::types::Result;

/// Which variables of a tracked function or type to record
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TrackSpec {
    /// Wildcard spec: the literal "*" admits every variable
    All(String),
    /// Explicit subset of variable names
    List(Vec<String>),
}

impl TrackSpec {
    /// The wildcard spec
    pub fn all() -> Self {
        TrackSpec::All("*".to_string())
    }

    /// An explicit list spec from anything yielding names
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TrackSpec::List(names.into_iter().map(Into::into).collect())
    }

    /// True if this spec admits the given variable name
    pub fn allows(&self, name: &str) -> bool {
        match self {
            TrackSpec::All(spec) => spec == "*",
            TrackSpec::List(names) => names.iter().any(|n| n == name),
        }
    }
}

/// Engine configuration (loaded from settings.json)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Substring a source path must contain for its events to be traced
    #[serde(default = "default_module_scope")]
    pub module_scope: String,

    /// Tracking keys for functions, each mapped to a variable spec
    #[serde(default)]
    pub track_functions: BTreeMap<String, TrackSpec>,

    /// Variable specs per enclosing type name, for method receivers
    #[serde(default)]
    pub track_classes: BTreeMap<String, TrackSpec>,

    /// Render the flat change log as a grid table on emission
    #[serde(default)]
    pub print_table: bool,

    /// Accepted for settings-document compatibility; renderer selection
    /// keys off `print_table` alone
    #[serde(default = "default_true")]
    pub print_lifecycle: bool,
}

fn default_module_scope() -> String {
    // Marker substring present in first-party Rust source paths
    "src".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            module_scope: default_module_scope(),
            track_functions: BTreeMap::new(),
            track_classes: BTreeMap::new(),
            print_table: false,
            print_lifecycle: true,
        }
    }
}

impl Settings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the traced source-path scope
    pub fn with_module_scope(mut self, scope: impl Into<String>) -> Self {
        self.module_scope = scope.into();
        self
    }

    /// Builder method: track a function key with the given variable spec
    pub fn track_function(mut self, key: impl Into<String>, spec: TrackSpec) -> Self {
        self.track_functions.insert(key.into(), spec);
        self
    }

    /// Builder method: track a type name with the given variable spec
    pub fn track_class(mut self, key: impl Into<String>, spec: TrackSpec) -> Self {
        self.track_classes.insert(key.into(), spec);
        self
    }

    /// Builder method: enable or disable tabular output
    pub fn with_table_output(mut self, enabled: bool) -> Self {
        self.print_table = enabled;
        self
    }

    /// Load settings from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to the settings document
    ///
    /// # Returns
    /// * `Result<Settings>` - Ok if read and parsed, Err otherwise
    pub fn load(path: &Path) -> Result<Settings> {
        let content = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings, substituting full defaults on any failure
    ///
    /// A missing file or malformed document is logged and replaced with
    /// [`Settings::default`]; this never propagates an error.
    pub fn load_or_default(path: &Path) -> Settings {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "Error loading settings from {:?}: {} - falling back to defaults",
                    path,
                    e
                );
                Settings::default()
            }
        }
    }
}
