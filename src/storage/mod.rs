//! Storage layer for paper-trail
//!
//! The [`Store`] trait is the seam between the engine and whatever persists
//! records and logs. Two reference implementations ship with the crate: an
//! in-memory store for tests and embedding, and a JSON-file store with an
//! append-only log.

pub mod file;
pub mod file_io;
pub mod memory;
pub mod query;

pub use file::FileStore;
pub use file_io::{read_json, write_json_atomic};
pub use memory::MemoryStore;
pub use query::LogQuery;

use async_trait::async_trait;

use crate::cancel::CancelToken;
use crate::error::AuditResult;
use crate::models::AuditLog;
use crate::tracker::{ChangeSet, EntityEntry, PropertyMap};

/// Persistence seam for records and their audit logs
///
/// `apply` is one commit round trip: pending record changes and the given
/// logs land together or not at all. The returned count covers record rows
/// plus one row per log header, detail, and metadata pair. Stores write
/// generated key values back into inserted entries during the commit, so
/// the caller can read them afterwards.
#[async_trait]
pub trait Store {
    /// Commit pending record changes and logs in one round trip
    fn apply(&mut self, changes: &mut ChangeSet, logs: &[AuditLog]) -> AuditResult<usize>;

    /// Awaitable commit
    ///
    /// The token comes along for implementations whose commits genuinely
    /// suspend; the engine itself has already observed it before staging
    /// any work, and the bundled stores do not re-check it mid-commit.
    async fn apply_async(
        &mut self,
        changes: &mut ChangeSet,
        logs: &[AuditLog],
        cancel: &CancelToken,
    ) -> AuditResult<usize>;

    /// Values currently stored for an entry's record, if the record exists
    fn stored_values(&self, entry: &EntityEntry) -> AuditResult<Option<PropertyMap>>;

    /// Every persisted log, oldest first
    fn audit_logs(&self) -> &[AuditLog];
}
