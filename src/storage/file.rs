//! JSON-file store
//!
//! Records live in one atomically rewritten JSON snapshot; logs append to a
//! line-delimited JSON file where each line is a complete log, so the trail
//! survives restarts without ever being rewritten.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::{AuditError, AuditResult};
use crate::models::AuditLog;
use crate::storage::file_io::{read_json, write_json_atomic};
use crate::storage::memory::MemoryStore;
use crate::storage::Store;
use crate::tracker::{ChangeSet, EntityEntry, PropertyMap};

const RECORDS_FILE: &str = "records.json";
const LOG_FILE: &str = "audit.jsonl";

/// Store persisting records and logs under one directory
pub struct FileStore {
    records_path: PathBuf,
    log_path: PathBuf,
    memory: MemoryStore,
}

impl FileStore {
    /// Open a store rooted at the given directory, loading any existing
    /// records and logs
    pub fn open(dir: impl AsRef<Path>) -> AuditResult<Self> {
        let dir = dir.as_ref();
        let records_path = dir.join(RECORDS_FILE);
        let log_path = dir.join(LOG_FILE);

        let mut memory: MemoryStore = read_json(&records_path)?;
        let logs = read_log_file(&log_path)?;
        debug!(
            path = %dir.display(),
            logs = logs.len(),
            "file store opened"
        );
        memory.push_logs(&logs);

        Ok(Self {
            records_path,
            log_path,
            memory,
        })
    }

    /// Stored row for one record, if present
    pub fn record(&self, type_full_name: &str, record_id: &str) -> Option<&PropertyMap> {
        self.memory.record(type_full_name, record_id)
    }

    /// Number of stored rows for one type
    pub fn record_count(&self, type_full_name: &str) -> usize {
        self.memory.record_count(type_full_name)
    }

    /// Append logs as JSON lines, flushing once at the end
    fn append_logs(&self, logs: &[AuditLog]) -> AuditResult<()> {
        if logs.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| AuditError::Store(format!("Failed to open audit log: {}", e)))?;

        for log in logs {
            let json = serde_json::to_string(log)
                .map_err(|e| AuditError::Json(format!("Failed to serialize audit log: {}", e)))?;
            writeln!(file, "{}", json)
                .map_err(|e| AuditError::Store(format!("Failed to write audit log: {}", e)))?;
        }

        file.flush()
            .map_err(|e| AuditError::Store(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    fn commit(&mut self, changes: &mut ChangeSet, logs: &[AuditLog]) -> AuditResult<usize> {
        let affected = self.memory.apply(changes, logs)?;
        write_json_atomic(&self.records_path, &self.memory)?;
        self.append_logs(logs)?;
        Ok(affected)
    }
}

/// Read every log line, oldest first; a missing file is an empty trail
fn read_log_file(path: &Path) -> AuditResult<Vec<AuditLog>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .map_err(|e| AuditError::Store(format!("Failed to open audit log: {}", e)))?;

    let reader = BufReader::new(file);
    let mut logs = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            AuditError::Store(format!("Failed to read audit log line {}: {}", line_num + 1, e))
        })?;

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let log: AuditLog = serde_json::from_str(&line).map_err(|e| {
            AuditError::Json(format!(
                "Failed to parse audit log at line {}: {}",
                line_num + 1,
                e
            ))
        })?;

        logs.push(log);
    }

    Ok(logs)
}

#[async_trait]
impl Store for FileStore {
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
        self.memory.stored_values(entry)
    }

    fn audit_logs(&self) -> &[AuditLog] {
        self.memory.audit_logs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuditLogDetail, EventType};
    use crate::tracker::EntityMeta;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn create_test_log(record_id: &str) -> AuditLog {
        let mut log = AuditLog::new(EventType::Added, "shop.Order", record_id);
        log.details
            .push(AuditLogDetail::new("Status", None, Some("Pending".into())));
        log
    }

    #[test]
    fn test_open_on_empty_directory() {
        let (store, _temp) = create_test_store();
        assert!(store.audit_logs().is_empty());
        assert_eq!(store.record_count("shop.Order"), 0);
    }

    #[test]
    fn test_records_and_logs_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut store = FileStore::open(temp_dir.path()).unwrap();
            let mut changes = ChangeSet::new();
            let mut values = PropertyMap::new();
            values.insert("Id".to_string(), json!(7));
            values.insert("Status".to_string(), json!("Pending"));
            let id = changes.attach(EntityMeta::new("shop.Order", ["Id"]), values);
            changes.set_property(id, "Status", json!("Shipped"));

            store.apply(&mut changes, &[create_test_log("7")]).unwrap();
        }

        let store = FileStore::open(temp_dir.path()).unwrap();
        assert_eq!(
            store.record("shop.Order", "7").unwrap().get("Status"),
            Some(&json!("Shipped"))
        );
        assert_eq!(store.audit_logs().len(), 1);
        assert_eq!(store.audit_logs()[0].record_id, "7");
    }

    #[test]
    fn test_log_lines_accumulate() {
        let (mut store, temp_dir) = create_test_store();

        for i in 0..3 {
            let mut changes = ChangeSet::new();
            store
                .apply(&mut changes, &[create_test_log(&i.to_string())])
                .unwrap();
        }

        let contents = std::fs::read_to_string(temp_dir.path().join(LOG_FILE)).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert_eq!(store.audit_logs().len(), 3);
    }

    #[test]
    fn test_generated_keys_continue_after_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut store = FileStore::open(temp_dir.path()).unwrap();
            let mut changes = ChangeSet::new();
            let mut values = PropertyMap::new();
            values.insert("Status".to_string(), json!("Pending"));
            changes.insert(EntityMeta::new("shop.Order", ["Id"]), values);
            store.apply(&mut changes, &[]).unwrap();
        }

        let mut store = FileStore::open(temp_dir.path()).unwrap();
        let mut changes = ChangeSet::new();
        let mut values = PropertyMap::new();
        values.insert("Status".to_string(), json!("Packed"));
        let id = changes.insert(EntityMeta::new("shop.Order", ["Id"]), values);
        store.apply(&mut changes, &[]).unwrap();

        assert_eq!(changes.entry(id).unwrap().property("Id"), Some(&json!(2)));
        assert_eq!(store.record_count("shop.Order"), 2);
    }
}
