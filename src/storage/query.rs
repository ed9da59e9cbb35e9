//! Read-side queries over persisted logs
//!
//! A query borrows the store's log slice and filters it lazily. Nothing is
//! copied until the caller iterates, and the same query can be iterated any
//! number of times.

use crate::models::AuditLog;

/// Lazy, restartable filter over persisted audit logs
#[derive(Debug, Clone)]
pub struct LogQuery<'a> {
    logs: &'a [AuditLog],
    type_full_name: Option<String>,
    record_id: Option<String>,
}

impl<'a> LogQuery<'a> {
    /// Query over every persisted log, oldest first
    pub fn new(logs: &'a [AuditLog]) -> Self {
        Self {
            logs,
            type_full_name: None,
            record_id: None,
        }
    }

    /// Keep only logs for one record type (exact match)
    pub fn for_type(mut self, type_full_name: impl Into<String>) -> Self {
        self.type_full_name = Some(type_full_name.into());
        self
    }

    /// Keep only logs for one record of one type (exact match)
    pub fn for_record(
        self,
        type_full_name: impl Into<String>,
        record_id: impl Into<String>,
    ) -> Self {
        let mut query = self.for_type(type_full_name);
        query.record_id = Some(record_id.into());
        query
    }

    /// Iterate the matching logs; calling this again restarts from the top
    pub fn iter(&self) -> impl Iterator<Item = &'a AuditLog> + '_ {
        self.logs.iter().filter(move |log| {
            if let Some(type_name) = &self.type_full_name {
                if log.type_full_name != *type_name {
                    return false;
                }
            }
            if let Some(record_id) = &self.record_id {
                if log.record_id != *record_id {
                    return false;
                }
            }
            true
        })
    }

    /// Number of matching logs
    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;

    fn create_test_logs() -> Vec<AuditLog> {
        vec![
            AuditLog::new(EventType::Added, "shop.Order", "1"),
            AuditLog::new(EventType::Modified, "shop.Order", "1"),
            AuditLog::new(EventType::Added, "shop.Order", "2"),
            AuditLog::new(EventType::Added, "shop.Customer", "1"),
        ]
    }

    #[test]
    fn test_unfiltered_query_sees_everything() {
        let logs = create_test_logs();
        let query = LogQuery::new(&logs);
        assert_eq!(query.count(), 4);
    }

    #[test]
    fn test_filter_by_type() {
        let logs = create_test_logs();
        let query = LogQuery::new(&logs).for_type("shop.Order");
        assert_eq!(query.count(), 3);
        assert!(query.iter().all(|l| l.type_full_name == "shop.Order"));
    }

    #[test]
    fn test_filter_by_record() {
        let logs = create_test_logs();
        let query = LogQuery::new(&logs).for_record("shop.Order", "1");
        let events: Vec<EventType> = query.iter().map(|l| l.event_type).collect();
        assert_eq!(events, vec![EventType::Added, EventType::Modified]);
    }

    #[test]
    fn test_record_filter_does_not_cross_types() {
        let logs = create_test_logs();
        let query = LogQuery::new(&logs).for_record("shop.Customer", "1");
        assert_eq!(query.count(), 1);
    }

    #[test]
    fn test_iteration_restarts() {
        let logs = create_test_logs();
        let query = LogQuery::new(&logs).for_type("shop.Order");

        let first: Vec<&str> = query.iter().map(|l| l.record_id.as_str()).collect();
        let second: Vec<&str> = query.iter().map(|l| l.record_id.as_str()).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["1", "1", "2"]);
    }
}
