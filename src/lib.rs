//! PaperTrail - Field-level audit trails for unit-of-work saves
//!
//! This library records who changed what, when, across the lifecycle of a
//! tracked save: inserts, edits, deletions, and soft deletions all leave
//! queryable audit logs with before and after values for every changed
//! property. Records are tracked as schemaless property maps, so any store
//! that can persist rows and logs can sit behind the trail.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Tracking configuration, soft-delete policy, per-type rules
//! - `error`: Custom error types
//! - `models`: Audit log records, details, and metadata
//! - `tracker`: Change set and dirty-state tracking for enrolled records
//! - `audit`: Key resolution, change classification, log assembly
//! - `storage`: Store trait, bundled stores, log queries
//! - `session`: The tracked session and two-phase save orchestration
//! - `cancel`: Cancellation token for async saves
//!
//! # Example
//!
//! ```rust,ignore
//! use paper_trail::config::TrackingConfig;
//! use paper_trail::storage::MemoryStore;
//! use paper_trail::TrackedSession;
//!
//! let mut session = TrackedSession::new(MemoryStore::new(), TrackingConfig::default());
//! let id = session.changes_mut().attach(meta, values);
//! session.changes_mut().set_property(id, "Status", json!("Shipped"));
//! session.save_changes_as("alice")?;
//! ```

pub mod audit;
pub mod cancel;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod tracker;

pub use cancel::CancelToken;
pub use error::{AuditError, AuditResult};
pub use session::{LogDecision, TrackedSession};
