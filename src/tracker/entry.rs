//! Tracked entries and their schema metadata

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuditError, AuditResult};
use crate::tracker::value::PropertyMap;

/// Declared schema for a tracked record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Full name of the record type
    pub type_full_name: String,

    /// Primary-key property names, in declaration order
    pub key_properties: Vec<String>,
}

impl EntityMeta {
    pub fn new<I, S>(type_full_name: impl Into<String>, key_properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_full_name: type_full_name.into(),
            key_properties: key_properties.into_iter().map(Into::into).collect(),
        }
    }
}

/// Stable handle to an entry within one change set
///
/// Handles stay valid across a commit, so an entry captured before saving can
/// be revisited afterwards with its generated key values in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u64);

/// Dirty-tracking state of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Pending insert
    Added,
    /// No pending changes
    Unchanged,
    /// One or more properties changed since attach
    Modified,
    /// Pending removal
    Deleted,
}

/// One record enrolled in a change set
#[derive(Debug, Clone)]
pub struct EntityEntry {
    pub id: EntryId,
    pub meta: EntityMeta,
    pub state: EntryState,

    /// Live property values, including uncommitted edits
    pub current: PropertyMap,

    /// Values as they were when the record was attached; `None` for entries
    /// that were inserted rather than attached
    pub original: Option<PropertyMap>,
}

impl EntityEntry {
    pub(crate) fn new(
        id: EntryId,
        meta: EntityMeta,
        state: EntryState,
        current: PropertyMap,
        original: Option<PropertyMap>,
    ) -> Self {
        Self {
            id,
            meta,
            state,
            current,
            original,
        }
    }

    pub fn type_full_name(&self) -> &str {
        &self.meta.type_full_name
    }

    /// Look up a live property value
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.current.get(name)
    }

    /// Look up a property value as of attach time
    pub fn original_property(&self, name: &str) -> Option<&Value> {
        self.original.as_ref().and_then(|map| map.get(name))
    }

    /// Original values, or the error surfaced when a modification or deletion
    /// is audited without them
    pub fn require_originals(&self) -> AuditResult<&PropertyMap> {
        self.original
            .as_ref()
            .ok_or_else(|| AuditError::missing_originals(&self.meta.type_full_name))
    }
}
