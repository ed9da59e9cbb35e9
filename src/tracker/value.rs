//! Property value representation and display conversion
//!
//! Tracked state is held as JSON values keyed by property name, which keeps
//! the engine independent of any particular record struct while preserving a
//! deterministic property order.

use serde_json::Value;
use std::collections::BTreeMap;

/// Property name to value map for one record's state
pub type PropertyMap = BTreeMap<String, Value>;

/// Convert a property value to its persisted text form
///
/// `Null` maps to `None` so that absent values stay distinguishable from the
/// literal string "null". Strings are stored bare, without surrounding
/// quotes; everything else uses its canonical JSON text.
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
