//! Per-type and per-property tracking rules
//!
//! Rules decide which record types produce logs at all, which properties are
//! left out of details, and which have their values masked. Types without an
//! explicit rule follow the collection's default posture.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sentinel written in place of a masked property's real value
pub const MASKED_VALUE: &str = "***";

/// Rules for one record type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRules {
    /// Explicit tracked/untracked override; `None` defers to the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracked: Option<bool>,

    /// Properties excluded from details entirely
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_properties: Vec<String>,

    /// Properties whose values are replaced with [`MASKED_VALUE`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub masked_properties: Vec<String>,
}

/// Rule collection covering every record type in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRules {
    /// Whether types without an explicit rule are tracked
    #[serde(default = "default_true")]
    track_by_default: bool,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    types: HashMap<String, TypeRules>,
}

fn default_true() -> bool {
    true
}

impl Default for TrackingRules {
    fn default() -> Self {
        Self {
            track_by_default: true,
            types: HashMap::new(),
        }
    }
}

impl TrackingRules {
    /// Rules that track every type unless told otherwise
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules that track nothing until a type is enrolled with
    /// [`TrackingRules::track_type`]
    pub fn opt_in() -> Self {
        Self {
            track_by_default: false,
            types: HashMap::new(),
        }
    }

    fn type_rules_mut(&mut self, type_full_name: impl Into<String>) -> &mut TypeRules {
        self.types.entry(type_full_name.into()).or_default()
    }

    /// Explicitly enroll a type for tracking
    pub fn track_type(&mut self, type_full_name: impl Into<String>) {
        self.type_rules_mut(type_full_name).tracked = Some(true);
    }

    /// Explicitly exclude a type from tracking
    pub fn skip_type(&mut self, type_full_name: impl Into<String>) {
        self.type_rules_mut(type_full_name).tracked = Some(false);
    }

    /// Leave a property out of a type's details
    pub fn skip_property(
        &mut self,
        type_full_name: impl Into<String>,
        property_name: impl Into<String>,
    ) {
        self.type_rules_mut(type_full_name)
            .skipped_properties
            .push(property_name.into());
    }

    /// Mask a property's values in a type's details
    pub fn mask_property(
        &mut self,
        type_full_name: impl Into<String>,
        property_name: impl Into<String>,
    ) {
        self.type_rules_mut(type_full_name)
            .masked_properties
            .push(property_name.into());
    }

    /// Whether a record type produces logs
    pub fn is_type_tracked(&self, type_full_name: &str) -> bool {
        self.types
            .get(type_full_name)
            .and_then(|r| r.tracked)
            .unwrap_or(self.track_by_default)
    }

    /// Whether a property participates in a type's details
    pub fn is_property_audited(&self, type_full_name: &str, property_name: &str) -> bool {
        !self
            .types
            .get(type_full_name)
            .map(|r| r.skipped_properties.iter().any(|p| p == property_name))
            .unwrap_or(false)
    }

    /// Whether a property's values are masked in details
    pub fn is_property_masked(&self, type_full_name: &str, property_name: &str) -> bool {
        self.types
            .get(type_full_name)
            .map(|r| r.masked_properties.iter().any(|p| p == property_name))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_types_tracked_by_default() {
        let rules = TrackingRules::new();
        assert!(rules.is_type_tracked("shop.Order"));
        assert!(rules.is_property_audited("shop.Order", "Status"));
        assert!(!rules.is_property_masked("shop.Order", "Status"));
    }

    #[test]
    fn test_skip_type_overrides_default() {
        let mut rules = TrackingRules::new();
        rules.skip_type("shop.SessionToken");
        assert!(!rules.is_type_tracked("shop.SessionToken"));
        assert!(rules.is_type_tracked("shop.Order"));
    }

    #[test]
    fn test_opt_in_requires_enrollment() {
        let mut rules = TrackingRules::opt_in();
        rules.track_type("shop.Order");
        assert!(rules.is_type_tracked("shop.Order"));
        assert!(!rules.is_type_tracked("shop.Customer"));
    }

    #[test]
    fn test_property_skip_and_mask() {
        let mut rules = TrackingRules::new();
        rules.skip_property("shop.Customer", "RowVersion");
        rules.mask_property("shop.Customer", "CardNumber");

        assert!(!rules.is_property_audited("shop.Customer", "RowVersion"));
        assert!(rules.is_property_audited("shop.Customer", "Name"));
        assert!(rules.is_property_masked("shop.Customer", "CardNumber"));
        // rules are scoped to their type
        assert!(rules.is_property_audited("shop.Order", "RowVersion"));
    }
}
