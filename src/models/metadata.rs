//! Caller-supplied metadata attached to every log of a save
//!
//! The bag is handed to the metadata hook once per save, mutable while the
//! hook runs and read-only afterwards. Pairs keep the order they were first
//! set in; re-setting a key overwrites its value without moving it. Pairs
//! whose value is `None` are dropped when logs are assembled.

use crate::models::log::LogMetadata;

/// Ordered key/value builder populated by the metadata hook
#[derive(Debug, Clone, Default)]
pub struct MetadataBag {
    entries: Vec<(String, Option<String>)>,
}

impl MetadataBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key to a value, overwriting in place if the key exists
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set_optional(key, Some(value.into()));
    }

    /// Set a key to an optional value; `None` pairs are dropped at assembly
    pub fn set_optional(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a key's value, if the key was set and carries one
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Materialize the persistable pairs, skipping `None` values
    pub fn to_rows(&self) -> Vec<LogMetadata> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| LogMetadata::new(k, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut bag = MetadataBag::new();
        bag.set("RequestId", "r-1");
        bag.set("Tenant", "acme");
        bag.set("Source", "api");

        let rows = bag.to_rows();
        let keys: Vec<&str> = rows.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["RequestId", "Tenant", "Source"]);
    }

    #[test]
    fn test_reset_overwrites_without_moving() {
        let mut bag = MetadataBag::new();
        bag.set("RequestId", "r-1");
        bag.set("Tenant", "acme");
        bag.set("RequestId", "r-2");

        let rows = bag.to_rows();
        assert_eq!(rows[0].key, "RequestId");
        assert_eq!(rows[0].value, "r-2");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_none_values_dropped_from_rows() {
        let mut bag = MetadataBag::new();
        bag.set("Kept", "yes");
        bag.set_optional("Dropped", None);

        assert_eq!(bag.len(), 2);
        let rows = bag.to_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "Kept");
    }

    #[test]
    fn test_get() {
        let mut bag = MetadataBag::new();
        bag.set("Tenant", "acme");
        bag.set_optional("Empty", None);

        assert_eq!(bag.get("Tenant"), Some("acme"));
        assert_eq!(bag.get("Empty"), None);
        assert_eq!(bag.get("Missing"), None);
    }
}
