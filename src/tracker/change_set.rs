//! The unit of work: a set of tracked entries with pending changes
//!
//! Callers enroll records with [`ChangeSet::attach`] (existing rows) or
//! [`ChangeSet::insert`] (new rows), edit them through
//! [`ChangeSet::set_property`], and mark removals with [`ChangeSet::remove`].
//! A save consumes the pending states and settles the set back to clean.

use serde_json::Value;

use crate::tracker::entry::{EntityEntry, EntityMeta, EntryId, EntryState};
use crate::tracker::value::PropertyMap;

/// Collection of tracked entries awaiting a save
#[derive(Debug, Default)]
pub struct ChangeSet {
    next_id: u64,
    entries: Vec<EntityEntry>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> EntryId {
        self.next_id += 1;
        EntryId(self.next_id)
    }

    /// Enroll an existing record; its values are captured as the originals
    pub fn attach(&mut self, meta: EntityMeta, values: PropertyMap) -> EntryId {
        let id = self.next_id();
        let original = values.clone();
        self.entries.push(EntityEntry::new(
            id,
            meta,
            EntryState::Unchanged,
            values,
            Some(original),
        ));
        id
    }

    /// Enroll a new record pending insert; it has no original values
    pub fn insert(&mut self, meta: EntityMeta, values: PropertyMap) -> EntryId {
        let id = self.next_id();
        self.entries
            .push(EntityEntry::new(id, meta, EntryState::Added, values, None));
        id
    }

    /// Update a live property value, marking a clean entry as modified
    ///
    /// Added entries stay added and deleted entries stay deleted. Returns
    /// false when the handle is not in the set.
    pub fn set_property(&mut self, id: EntryId, name: impl Into<String>, value: Value) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.current.insert(name.into(), value);
                if entry.state == EntryState::Unchanged {
                    entry.state = EntryState::Modified;
                }
                true
            }
            None => false,
        }
    }

    /// Mark an entry for removal
    ///
    /// An entry that was never saved simply leaves the set. Returns false
    /// when the handle is not in the set.
    pub fn remove(&mut self, id: EntryId) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        if self.entries[index].state == EntryState::Added {
            self.entries.remove(index);
        } else {
            self.entries[index].state = EntryState::Deleted;
        }
        true
    }

    pub fn entry(&self, id: EntryId) -> Option<&EntityEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub(crate) fn entry_mut(&mut self, id: EntryId) -> Option<&mut EntityEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// All tracked entries, in enrollment order
    pub fn entries(&self) -> impl Iterator<Item = &EntityEntry> {
        self.entries.iter()
    }

    /// Mutable view over the entries, used by stores to write generated keys
    /// back into inserted records during a commit
    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut EntityEntry> {
        self.entries.iter_mut()
    }

    /// Entries currently in the given state, in enrollment order
    pub fn entries_in_state(&self, state: EntryState) -> impl Iterator<Item = &EntityEntry> {
        self.entries.iter().filter(move |e| e.state == state)
    }

    /// Handles of entries currently in the given state
    pub fn ids_in_state(&self, state: EntryState) -> Vec<EntryId> {
        self.entries_in_state(state).map(|e| e.id).collect()
    }

    pub fn has_changes(&self) -> bool {
        self.entries.iter().any(|e| e.state != EntryState::Unchanged)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collapse pending states after a successful commit: inserts and edits
    /// become clean with fresh originals, removals leave the set
    pub(crate) fn accept_changes(&mut self) {
        self.entries.retain(|e| e.state != EntryState::Deleted);
        for entry in &mut self.entries {
            entry.state = EntryState::Unchanged;
            entry.original = Some(entry.current.clone());
        }
    }
}
