//! Change event classification
//!
//! Every persisted audit log carries exactly one event type describing what
//! happened to the record during the save that produced it.

use serde::{Deserialize, Serialize};

/// Types of change events that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Record was inserted
    Added,
    /// One or more tracked properties changed value
    Modified,
    /// Record was physically removed
    Deleted,
    /// Record was flagged deleted but kept in place
    SoftDeleted,
    /// A soft-deleted record was restored
    UnDeleted,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Added => write!(f, "ADDED"),
            EventType::Modified => write!(f, "MODIFIED"),
            EventType::Deleted => write!(f, "DELETED"),
            EventType::SoftDeleted => write!(f, "SOFT-DELETED"),
            EventType::UnDeleted => write!(f, "UNDELETED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_display() {
        assert_eq!(EventType::Added.to_string(), "ADDED");
        assert_eq!(EventType::Modified.to_string(), "MODIFIED");
        assert_eq!(EventType::SoftDeleted.to_string(), "SOFT-DELETED");
    }

    #[test]
    fn test_event_type_serialization() {
        let json = serde_json::to_string(&EventType::SoftDeleted).unwrap();
        assert_eq!(json, "\"soft_deleted\"");

        let parsed: EventType = serde_json::from_str("\"un_deleted\"").unwrap();
        assert_eq!(parsed, EventType::UnDeleted);
    }
}
