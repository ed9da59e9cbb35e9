//! Detail production for each kind of change event
//!
//! A classifier pairs one dirty entry with the event being recorded and
//! produces its before/after detail rows. Additions report every tracked
//! property from absent to current, deletions from original to absent, and
//! modifications diff the two maps and report only what changed. Soft
//! deletions shape their details like deletions, undeletions like additions.

use serde_json::Value;

use crate::config::{TrackingConfig, MASKED_VALUE};
use crate::error::AuditResult;
use crate::models::{AuditLogDetail, EventType};
use crate::tracker::{display_value, EntityEntry, PropertyMap};

/// One dirty entry paired with the event to record for it
#[derive(Debug)]
pub enum DetailClassifier<'a> {
    Addition(&'a EntityEntry),
    Modification(&'a EntityEntry),
    Deletion(&'a EntityEntry),
    SoftDeletion(&'a EntityEntry),
    UnDeletion(&'a EntityEntry),
}

impl<'a> DetailClassifier<'a> {
    /// Pick the classifier for an event
    pub fn for_event(event_type: EventType, entry: &'a EntityEntry) -> Self {
        match event_type {
            EventType::Added => Self::Addition(entry),
            EventType::Modified => Self::Modification(entry),
            EventType::Deleted => Self::Deletion(entry),
            EventType::SoftDeleted => Self::SoftDeletion(entry),
            EventType::UnDeleted => Self::UnDeletion(entry),
        }
    }

    /// Produce the detail rows for this entry and event
    ///
    /// Excluded properties are left out, masked properties report the mask
    /// sentinel instead of their real values, and a result with no rows
    /// means the change has nothing auditable in it.
    pub fn produce_details(&self, config: &TrackingConfig) -> AuditResult<Vec<AuditLogDetail>> {
        match self {
            Self::Addition(entry) | Self::UnDeletion(entry) => {
                Ok(appearing_details(entry, &entry.current, config))
            }
            Self::Deletion(entry) | Self::SoftDeletion(entry) => {
                let originals = entry.require_originals()?;
                Ok(disappearing_details(entry, originals, config))
            }
            Self::Modification(entry) => {
                let originals = entry.require_originals()?;
                Ok(changed_details(entry, originals, config))
            }
        }
    }
}

/// Everything tracked goes from absent to its current value
fn appearing_details(
    entry: &EntityEntry,
    values: &PropertyMap,
    config: &TrackingConfig,
) -> Vec<AuditLogDetail> {
    values
        .iter()
        .filter(|(name, _)| audited(entry, name, config))
        .map(|(name, value)| {
            AuditLogDetail::new(name, None, detail_value(entry, name, value, config))
        })
        .collect()
}

/// Everything tracked goes from its original value to absent
fn disappearing_details(
    entry: &EntityEntry,
    originals: &PropertyMap,
    config: &TrackingConfig,
) -> Vec<AuditLogDetail> {
    originals
        .iter()
        .filter(|(name, _)| audited(entry, name, config))
        .map(|(name, value)| {
            AuditLogDetail::new(name, detail_value(entry, name, value, config), None)
        })
        .collect()
}

/// Only properties whose value actually changed produce a row
fn changed_details(
    entry: &EntityEntry,
    originals: &PropertyMap,
    config: &TrackingConfig,
) -> Vec<AuditLogDetail> {
    entry
        .current
        .iter()
        .filter(|(name, _)| audited(entry, name, config))
        .filter_map(|(name, current_value)| {
            let original_value = originals.get(name).unwrap_or(&Value::Null);
            if original_value == current_value {
                return None;
            }
            Some(AuditLogDetail::new(
                name,
                detail_value(entry, name, original_value, config),
                detail_value(entry, name, current_value, config),
            ))
        })
        .collect()
}

fn audited(entry: &EntityEntry, property_name: &str, config: &TrackingConfig) -> bool {
    config
        .rules
        .is_property_audited(entry.type_full_name(), property_name)
}

/// Persisted text for one value, with masking applied
///
/// Masking preserves null-ness: an absent value stays absent rather than
/// becoming the sentinel.
fn detail_value(
    entry: &EntityEntry,
    property_name: &str,
    value: &Value,
    config: &TrackingConfig,
) -> Option<String> {
    if config
        .rules
        .is_property_masked(entry.type_full_name(), property_name)
    {
        if value.is_null() {
            None
        } else {
            Some(MASKED_VALUE.to_string())
        }
    } else {
        display_value(value)
    }
}
