//! Tracking key resolution
//!
//! Maps a traced scope (module, file stem, function, optional enclosing type)
//! to the configured tracking key identifying it, or to nothing when the
//! scope is not tracked. Resolution is pure: same inputs, same answer.

use crate::settings::Settings;

/// Tracking key resolver - candidate matching against the settings
pub struct KeyResolver;

impl KeyResolver {
    /// Resolve the tracking key for a scope
    ///
    /// With no function filters configured, or no class filters while inside
    /// a method, every scope is tracked under its bare function name.
    /// Otherwise candidate keys are tried most-specific-first and the first
    /// one present in `track_functions` or `track_classes` wins.
    ///
    /// # Arguments
    /// * `module_name` - Declared module name, "."-separated
    /// * `file_name` - Stem of the source file
    /// * `func_name` - Name of the function
    /// * `class_name` - Enclosing type name, when the call is a method
    /// * `settings` - Tracking configuration
    ///
    /// # Returns
    /// * `Some(key)` if the scope is tracked, `None` otherwise
    pub fn resolve(
        module_name: &str,
        file_name: &str,
        func_name: &str,
        class_name: Option<&str>,
        settings: &Settings,
    ) -> Option<String> {
        if (class_name.is_some() && settings.track_classes.is_empty())
            || settings.track_functions.is_empty()
        {
            return Some(func_name.to_string());
        }

        // Candidate keys in fixed precedence order, most specific first.
        // Class-qualified candidates exist only for method calls.
        let mut candidates = Vec::with_capacity(6);
        candidates.push(format!("{}.{}.{}", module_name, file_name, func_name));
        if let Some(class_name) = class_name {
            candidates.push(format!(
                "{}.{}.{}.{}",
                module_name, file_name, class_name, func_name
            ));
        }
        candidates.push(format!("{}.{}", file_name, func_name));
        if let Some(class_name) = class_name {
            candidates.push(format!("{}.{}.{}", file_name, class_name, func_name));
            candidates.push(format!("{}.{}", class_name, func_name));
        }
        candidates.push(func_name.to_string());

        candidates.into_iter().find(|key| {
            settings.track_functions.contains_key(key) || settings.track_classes.contains_key(key)
        })
    }
}
