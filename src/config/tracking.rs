//! Tracking configuration
//!
//! One owned [`TrackingConfig`] value is handed to the session at
//! construction. There is no global registry; two sessions can run with
//! different configurations side by side.

use serde::{Deserialize, Serialize};

use super::rules::TrackingRules;

/// Where original values come from when auditing modifications and deletions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Use the originals captured when the record was attached (default)
    #[default]
    Tracked,
    /// Fetch the currently stored values from the backing store at save time,
    /// for records that were edited while detached
    Refetch,
}

/// Which record types soft-delete instead of physically deleting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeletePolicy {
    /// Boolean property that flags a record as deleted
    pub flag_property: String,

    /// Full names of the record types the policy applies to
    #[serde(default)]
    pub types: Vec<String>,
}

impl SoftDeletePolicy {
    pub fn new(flag_property: impl Into<String>) -> Self {
        Self {
            flag_property: flag_property.into(),
            types: Vec::new(),
        }
    }

    /// Add a record type to the policy
    pub fn with_type(mut self, type_full_name: impl Into<String>) -> Self {
        self.types.push(type_full_name.into());
        self
    }

    /// Check whether a record type soft-deletes under this policy
    pub fn applies_to(&self, type_full_name: &str) -> bool {
        self.types.iter().any(|t| t == type_full_name)
    }
}

/// Audit-trail configuration for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Master switch for the whole audit pipeline
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Audit inserted records
    #[serde(default = "default_true")]
    pub additions: bool,

    /// Audit edited records
    #[serde(default = "default_true")]
    pub modifications: bool,

    /// Audit removed records
    #[serde(default = "default_true")]
    pub deletions: bool,

    /// Source of original values for diffing
    #[serde(default)]
    pub value_source: ValueSource,

    /// Soft-delete rewriting, when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_delete: Option<SoftDeletePolicy>,

    /// Per-type and per-property tracking rules
    #[serde(default)]
    pub rules: TrackingRules,
}

fn default_true() -> bool {
    true
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            additions: true,
            modifications: true,
            deletions: true,
            value_source: ValueSource::default(),
            soft_delete: None,
            rules: TrackingRules::default(),
        }
    }
}

impl TrackingConfig {
    /// Configuration with auditing switched off entirely
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Whether a save should run the audit pipeline at all: the master
    /// switch is on and at least one change category is enabled
    pub fn tracking_active(&self) -> bool {
        self.enabled && (self.additions || self.modifications || self.deletions)
    }
}
