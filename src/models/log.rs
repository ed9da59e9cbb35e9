//! Persisted audit log structures
//!
//! An [`AuditLog`] is the header row for one change event on one record. Its
//! child [`AuditLogDetail`] rows carry per-property before/after values, and
//! [`LogMetadata`] rows carry caller-supplied context such as a request id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::event::EventType;
use crate::models::ids::AuditLogId;

/// One audited change event for a single record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// Unique log identifier
    pub id: AuditLogId,

    /// Who performed the change, if attribution was configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// When the change was recorded (UTC)
    pub event_date_utc: DateTime<Utc>,

    /// What kind of change this was
    pub event_type: EventType,

    /// Full name of the record's declared type
    pub type_full_name: String,

    /// Serialized primary key of the record
    pub record_id: String,

    /// Caller-supplied context pairs, in the order they were set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<LogMetadata>,

    /// Per-property before/after values
    pub details: Vec<AuditLogDetail>,
}

impl AuditLog {
    /// Create a log header with a fresh id and timestamp
    pub fn new(
        event_type: EventType,
        type_full_name: impl Into<String>,
        record_id: impl Into<String>,
    ) -> Self {
        Self {
            id: AuditLogId::new(),
            user_name: None,
            event_date_utc: Utc::now(),
            event_type,
            type_full_name: type_full_name.into(),
            record_id: record_id.into(),
            metadata: Vec::new(),
            details: Vec::new(),
        }
    }

    /// Number of rows this log occupies when persisted: the header plus one
    /// row per detail and one per metadata pair
    pub fn row_count(&self) -> usize {
        1 + self.details.len() + self.metadata.len()
    }

    /// Format the log for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.event_date_utc.format("%Y-%m-%d %H:%M:%S UTC"),
            self.event_type,
            self.type_full_name,
            self.record_id
        );

        if let Some(user) = &self.user_name {
            output.push_str(&format!(" by {}", user));
        }

        for detail in &self.details {
            output.push_str(&format!(
                "\n  {}: {} -> {}",
                detail.property_name,
                detail.original_value.as_deref().unwrap_or("(none)"),
                detail.new_value.as_deref().unwrap_or("(none)")
            ));
        }

        output
    }
}

/// Before/after values for one property of one audited change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogDetail {
    /// Name of the property
    pub property_name: String,

    /// Value before the change; absent for additions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value: Option<String>,

    /// Value after the change; absent for deletions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

impl AuditLogDetail {
    pub fn new(
        property_name: impl Into<String>,
        original_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            original_value,
            new_value,
        }
    }
}

/// One caller-supplied key/value pair attached to a log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMetadata {
    pub key: String,
    pub value: String,
}

impl LogMetadata {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
