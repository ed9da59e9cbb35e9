//! Tracked session: the save orchestrator
//!
//! A [`TrackedSession`] owns a change set, a store, and the tracking
//! configuration, and drives the two-phase save protocol:
//!
//! 1. Deletions of soft-delete types are rewritten into flag updates.
//! 2. Modification and deletion logs are assembled and staged.
//! 3. The first commit sends record changes and staged logs together; the
//!    store writes generated keys back into inserted entries and the change
//!    set settles.
//! 4. Addition logs are assembled now that keys exist, and a second commit
//!    sends them. Their keys are unknowable any earlier, which is why the
//!    trail always costs additions a second round trip.
//!
//! The returned count sums both commits. On the async path the cancellation
//! token is observed once at entry, before any staging or mutation; a save
//! that has started is never torn mid-flight. If the second commit fails the
//! first stays committed, so record changes and pre-save logs survive while
//! addition logs are lost; callers that cannot tolerate the gap should wrap
//! the store in their own transaction.

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::audit::assemble;
use crate::cancel::CancelToken;
use crate::config::{TrackingConfig, ValueSource};
use crate::error::{AuditError, AuditResult};
use crate::models::{AuditLog, EventType, MetadataBag};
use crate::storage::{LogQuery, Store};
use crate::tracker::{ChangeSet, EntityEntry, EntryId, EntryState};

/// Verdict of the log-generated hook for one staged log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDecision {
    /// Persist the log
    Keep,
    /// Drop the log before it is committed
    Skip,
}

type UsernameProvider = Box<dyn Fn() -> Option<String> + Send>;
type MetadataHook = Box<dyn Fn(&mut MetadataBag) + Send>;
type LogFilter = Box<dyn Fn(&AuditLog) -> LogDecision + Send>;

/// Everything fixed at the start of one save
struct StagedSave {
    user_name: Option<String>,
    metadata: MetadataBag,
    /// Handles of entries that were pending insert when staging ran
    added: Vec<EntryId>,
    /// Modification and deletion logs awaiting the first commit
    logs: Vec<AuditLog>,
}

/// Unit of work with an audit trail attached
pub struct TrackedSession<S: Store> {
    store: S,
    changes: ChangeSet,
    config: TrackingConfig,
    username_provider: Option<UsernameProvider>,
    default_username: Option<String>,
    metadata_hook: Option<MetadataHook>,
    log_filter: Option<LogFilter>,
}

impl<S: Store> TrackedSession<S> {
    pub fn new(store: S, config: TrackingConfig) -> Self {
        Self {
            store,
            changes: ChangeSet::new(),
            config,
            username_provider: None,
            default_username: None,
            metadata_hook: None,
            log_filter: None,
        }
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn changes_mut(&mut self) -> &mut ChangeSet {
        &mut self.changes
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Install a username provider consulted when a save has no explicit user
    pub fn configure_username<F>(&mut self, provider: F)
    where
        F: Fn() -> Option<String> + Send + 'static,
    {
        self.username_provider = Some(Box::new(provider));
    }

    /// Fallback username when neither an explicit user nor the provider
    /// yields one
    pub fn set_default_username(&mut self, user_name: impl Into<String>) {
        self.default_username = Some(user_name.into());
    }

    /// Install the hook that populates the metadata bag once per save
    pub fn configure_metadata<F>(&mut self, hook: F)
    where
        F: Fn(&mut MetadataBag) + Send + 'static,
    {
        self.metadata_hook = Some(Box::new(hook));
    }

    /// Install a filter that can drop individual logs before they commit
    pub fn on_log_generated<F>(&mut self, filter: F)
    where
        F: Fn(&AuditLog) -> LogDecision + Send + 'static,
    {
        self.log_filter = Some(Box::new(filter));
    }

    /// Save pending changes, attributing logs through the provider chain
    pub fn save_changes(&mut self) -> AuditResult<usize> {
        self.save_with_user(None)
    }

    /// Save pending changes, attributing logs to the given user
    pub fn save_changes_as(&mut self, user_name: &str) -> AuditResult<usize> {
        self.save_with_user(Some(user_name))
    }

    /// Awaitable [`TrackedSession::save_changes`]
    pub async fn save_changes_async(&mut self, cancel: &CancelToken) -> AuditResult<usize> {
        self.save_with_user_async(None, cancel).await
    }

    /// Awaitable [`TrackedSession::save_changes_as`]
    pub async fn save_changes_as_async(
        &mut self,
        user_name: &str,
        cancel: &CancelToken,
    ) -> AuditResult<usize> {
        self.save_with_user_async(Some(user_name), cancel).await
    }

    /// Query every persisted log
    pub fn logs(&self) -> LogQuery<'_> {
        LogQuery::new(self.store.audit_logs())
    }

    /// Query persisted logs for one record type
    pub fn logs_for_type(&self, type_full_name: &str) -> LogQuery<'_> {
        self.logs().for_type(type_full_name)
    }

    /// Query persisted logs for one record of one type
    pub fn logs_for_record(&self, type_full_name: &str, record_id: &str) -> LogQuery<'_> {
        self.logs().for_record(type_full_name, record_id)
    }

    fn save_with_user(&mut self, explicit_user: Option<&str>) -> AuditResult<usize> {
        // With tracking off the save is a plain commit
        if !self.config.tracking_active() {
            let count = self.store.apply(&mut self.changes, &[])?;
            self.changes.accept_changes();
            return Ok(count);
        }

        let staging = self.stage(explicit_user)?;

        // First commit: record changes and pre-save logs land together
        let primary = self.store.apply(&mut self.changes, &staging.logs)?;
        self.changes.accept_changes();

        // Second commit: addition logs, now that generated keys exist
        let addition_logs = self.addition_logs(&staging)?;
        let audit = if addition_logs.is_empty() {
            0
        } else {
            match self.store.apply(&mut self.changes, &addition_logs) {
                Ok(count) => count,
                Err(err) => {
                    // the first commit stands; only the addition logs are lost
                    warn!(lost = addition_logs.len(), "second commit failed");
                    return Err(err);
                }
            }
        };

        debug!(
            rows = primary + audit,
            staged = staging.logs.len(),
            additions = addition_logs.len(),
            "save completed"
        );
        Ok(primary + audit)
    }

    async fn save_with_user_async(
        &mut self,
        explicit_user: Option<&str>,
        cancel: &CancelToken,
    ) -> AuditResult<usize> {
        // Cancellation is observed exactly once, before any mutation
        if cancel.is_cancelled() {
            return Err(AuditError::Cancelled);
        }

        if !self.config.tracking_active() {
            let count = self.store.apply_async(&mut self.changes, &[], cancel).await?;
            self.changes.accept_changes();
            return Ok(count);
        }

        let staging = self.stage(explicit_user)?;

        let primary = self
            .store
            .apply_async(&mut self.changes, &staging.logs, cancel)
            .await?;
        self.changes.accept_changes();

        let addition_logs = self.addition_logs(&staging)?;
        let audit = if addition_logs.is_empty() {
            0
        } else {
            match self
                .store
                .apply_async(&mut self.changes, &addition_logs, cancel)
                .await
            {
                Ok(count) => count,
                Err(err) => {
                    // the first commit stands; only the addition logs are lost
                    warn!(lost = addition_logs.len(), "second commit failed");
                    return Err(err);
                }
            }
        };

        debug!(
            rows = primary + audit,
            staged = staging.logs.len(),
            additions = addition_logs.len(),
            "save completed"
        );
        Ok(primary + audit)
    }

    /// Run the pre-commit pipeline: soft-delete rewriting, attribution,
    /// metadata, the addition snapshot, and staged modification and
    /// deletion logs
    fn stage(&mut self, explicit_user: Option<&str>) -> AuditResult<StagedSave> {
        self.rewrite_soft_deletes();

        let user_name = self.resolve_username(explicit_user);

        // The bag is mutable only while the hook runs
        let mut metadata = MetadataBag::new();
        if let Some(hook) = &self.metadata_hook {
            hook(&mut metadata);
        }

        // Additions are audited after the first commit, once keys exist
        let added = self.changes.ids_in_state(EntryState::Added);

        if self.config.value_source == ValueSource::Refetch {
            self.install_stored_originals()?;
        }

        let mut logs = Vec::new();
        if self.config.modifications {
            for entry in self.changes.entries_in_state(EntryState::Modified) {
                let event = self.modification_event(entry);
                if let Some(log) =
                    assemble(entry, event, user_name.as_deref(), &metadata, &self.config)?
                {
                    if self.keep(&log) {
                        logs.push(log);
                    }
                }
            }
        }
        if self.config.deletions {
            for entry in self.changes.entries_in_state(EntryState::Deleted) {
                if let Some(log) = assemble(
                    entry,
                    EventType::Deleted,
                    user_name.as_deref(),
                    &metadata,
                    &self.config,
                )? {
                    if self.keep(&log) {
                        logs.push(log);
                    }
                }
            }
        }

        Ok(StagedSave {
            user_name,
            metadata,
            added,
            logs,
        })
    }

    /// Rewrite deletions of soft-delete types into flag updates
    ///
    /// The check binds to the entry's declared type, so one save can mix
    /// hard and soft deletions across types.
    fn rewrite_soft_deletes(&mut self) {
        let Some(policy) = self.config.soft_delete.clone() else {
            return;
        };

        for id in self.changes.ids_in_state(EntryState::Deleted) {
            let Some(entry) = self.changes.entry_mut(id) else {
                continue;
            };
            if !policy.applies_to(entry.type_full_name()) {
                continue;
            }
            entry
                .current
                .insert(policy.flag_property.clone(), json!(true));
            entry.state = EntryState::Modified;
            debug!(
                record_type = entry.type_full_name(),
                "deletion rewritten to soft delete"
            );
        }
    }

    /// Event recorded for a modified entry, distinguishing soft-delete flag
    /// transitions from ordinary edits
    fn modification_event(&self, entry: &EntityEntry) -> EventType {
        let Some(policy) = &self.config.soft_delete else {
            return EventType::Modified;
        };
        if !policy.applies_to(entry.type_full_name()) {
            return EventType::Modified;
        }

        let original = entry
            .original_property(&policy.flag_property)
            .and_then(Value::as_bool);
        let current = entry.property(&policy.flag_property).and_then(Value::as_bool);
        match (original, current) {
            (Some(false), Some(true)) => EventType::SoftDeleted,
            (Some(true), Some(false)) => EventType::UnDeleted,
            // A missing or non-boolean flag reads as an ordinary edit
            _ => EventType::Modified,
        }
    }

    /// Replace captured originals with the store's current values for every
    /// entry about to be audited as a modification or deletion
    fn install_stored_originals(&mut self) -> AuditResult<()> {
        let mut ids = Vec::new();
        if self.config.modifications {
            ids.extend(self.changes.ids_in_state(EntryState::Modified));
        }
        if self.config.deletions {
            ids.extend(self.changes.ids_in_state(EntryState::Deleted));
        }

        for id in ids {
            let Some(entry) = self.changes.entry(id) else {
                continue;
            };
            let type_name = entry.type_full_name().to_string();
            if !self.config.rules.is_type_tracked(&type_name) {
                continue;
            }

            let stored = self.store.stored_values(entry)?;
            let values = stored.ok_or_else(|| AuditError::missing_originals(type_name))?;
            if let Some(entry) = self.changes.entry_mut(id) {
                entry.original = Some(values);
            }
        }
        Ok(())
    }

    /// Assemble logs for the entries that were inserted this save
    fn addition_logs(&self, staging: &StagedSave) -> AuditResult<Vec<AuditLog>> {
        if !self.config.additions || staging.added.is_empty() {
            return Ok(Vec::new());
        }

        let mut logs = Vec::new();
        for id in &staging.added {
            let Some(entry) = self.changes.entry(*id) else {
                continue;
            };
            if let Some(log) = assemble(
                entry,
                EventType::Added,
                staging.user_name.as_deref(),
                &staging.metadata,
                &self.config,
            )? {
                if self.keep(&log) {
                    logs.push(log);
                }
            }
        }
        Ok(logs)
    }

    /// Explicit user, then the provider, then the configured default
    fn resolve_username(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::to_owned)
            .or_else(|| self.username_provider.as_ref().and_then(|provider| provider()))
            .or_else(|| self.default_username.clone())
    }

    fn keep(&self, log: &AuditLog) -> bool {
        let Some(filter) = &self.log_filter else {
            return true;
        };
        match filter(log) {
            LogDecision::Keep => true,
            LogDecision::Skip => {
                debug!(
                    record_type = %log.type_full_name,
                    record_id = %log.record_id,
                    "audit log dropped by filter"
                );
                false
            }
        }
    }
}
