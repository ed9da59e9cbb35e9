//! Log assembly
//!
//! Joins key resolution, classification, attribution, and metadata into one
//! persistable [`AuditLog`]. Assembly is where a change can drop out of the
//! trail legitimately: untracked types and detail-less changes produce no
//! log at all.

use crate::audit::classifier::DetailClassifier;
use crate::audit::keys::{record_id, resolve_keys};
use crate::config::TrackingConfig;
use crate::error::AuditResult;
use crate::models::{AuditLog, EventType, MetadataBag};
use crate::tracker::EntityEntry;

/// Build the audit log for one entry and event, or `None` when the entry's
/// type is untracked or the classifier yields no details
pub fn assemble(
    entry: &EntityEntry,
    event_type: EventType,
    user_name: Option<&str>,
    metadata: &MetadataBag,
    config: &TrackingConfig,
) -> AuditResult<Option<AuditLog>> {
    if !config.rules.is_type_tracked(entry.type_full_name()) {
        return Ok(None);
    }

    let keys = resolve_keys(entry)?;
    let record_id = record_id(entry, &keys)?;

    let details = DetailClassifier::for_event(event_type, entry).produce_details(config)?;
    if details.is_empty() {
        return Ok(None);
    }

    let mut log = AuditLog::new(event_type, entry.type_full_name(), record_id);
    log.user_name = user_name.map(str::to_owned);
    log.metadata = metadata.to_rows();
    log.details = details;
    Ok(Some(log))
}
