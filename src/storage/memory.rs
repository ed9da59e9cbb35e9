//! In-memory store
//!
//! Reference [`Store`] implementation backed by per-type tables. Suits tests
//! and embedded use, and doubles as the working state of the file store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::audit::{record_id, resolve_keys};
use crate::cancel::CancelToken;
use crate::error::AuditResult;
use crate::models::AuditLog;
use crate::storage::Store;
use crate::tracker::{ChangeSet, EntityEntry, EntryState, PropertyMap};

type Table = BTreeMap<String, PropertyMap>;

/// Store holding records and logs in process memory
///
/// Inserted records of single-key types receive a generated sequential key
/// when their key value is absent or null, the way identity columns behave.
/// Composite keys are never generated; callers supply them.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    next_generated_key: i64,

    /// Record tables keyed by type full name, rows keyed by record id
    #[serde(default)]
    tables: HashMap<String, Table>,

    /// Persisted logs live beside the tables but are not part of the
    /// serialized snapshot; the file store keeps them in its own log file
    #[serde(skip)]
    logs: Vec<AuditLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored row for one record, if present
    pub fn record(&self, type_full_name: &str, record_id: &str) -> Option<&PropertyMap> {
        self.tables.get(type_full_name)?.get(record_id)
    }

    /// Number of stored rows for one type
    pub fn record_count(&self, type_full_name: &str) -> usize {
        self.tables.get(type_full_name).map_or(0, |t| t.len())
    }

    pub(crate) fn push_logs(&mut self, logs: &[AuditLog]) {
        self.logs.extend_from_slice(logs);
    }

    fn fill_generated_key(&mut self, entry: &mut EntityEntry) {
        if entry.meta.key_properties.len() != 1 {
            return;
        }
        let name = entry.meta.key_properties[0].clone();
        let needs_key = entry.current.get(&name).map_or(true, Value::is_null);
        if needs_key {
            self.next_generated_key += 1;
            entry.current.insert(name, json!(self.next_generated_key));
        }
    }

    fn commit(&mut self, changes: &mut ChangeSet, logs: &[AuditLog]) -> AuditResult<usize> {
        for entry in changes.entries_mut() {
            if entry.state == EntryState::Added {
                self.fill_generated_key(entry);
            }
        }

        let mut record_rows = 0;
        for entry in changes.entries() {
            match entry.state {
                EntryState::Unchanged => continue,
                EntryState::Added | EntryState::Modified => {
                    let id = row_id(entry)?;
                    self.tables
                        .entry(entry.type_full_name().to_string())
                        .or_default()
                        .insert(id, entry.current.clone());
                }
                EntryState::Deleted => {
                    let id = row_id(entry)?;
                    if let Some(table) = self.tables.get_mut(entry.type_full_name()) {
                        table.remove(&id);
                    }
                }
            }
            record_rows += 1;
        }

        let log_rows: usize = logs.iter().map(AuditLog::row_count).sum();
        self.push_logs(logs);

        debug!(records = record_rows, logs = logs.len(), "change set committed");
        Ok(record_rows + log_rows)
    }
}

/// Identity a row is stored under: the entry's serialized primary key
fn row_id(entry: &EntityEntry) -> AuditResult<String> {
    let keys = resolve_keys(entry)?;
    record_id(entry, &keys)
}

#[async_trait]
impl Store for MemoryStore {
    fn apply(&mut self, changes: &mut ChangeSet, logs: &[AuditLog]) -> AuditResult<usize> {
        self.commit(changes, logs)
    }

    async fn apply_async(
        &mut self,
        changes: &mut ChangeSet,
        logs: &[AuditLog],
        _cancel: &CancelToken,
    ) -> AuditResult<usize> {
        self.commit(changes, logs)
    }

    fn stored_values(&self, entry: &EntityEntry) -> AuditResult<Option<PropertyMap>> {
        let id = row_id(entry)?;
        Ok(self
            .tables
            .get(entry.type_full_name())
            .and_then(|table| table.get(&id))
            .cloned())
    }

    fn audit_logs(&self) -> &[AuditLog] {
        &self.logs
    }
}
