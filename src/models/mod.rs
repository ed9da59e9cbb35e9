//! Core data models for paper-trail
//!
//! This module contains the persisted audit shapes: log headers, per-property
//! details, metadata pairs, and the supporting id and event types.

pub mod event;
pub mod ids;
pub mod log;
pub mod metadata;
pub mod property;

pub use event::EventType;
pub use ids::AuditLogId;
pub use log::{AuditLog, AuditLogDetail, LogMetadata};
pub use metadata::MetadataBag;
pub use property::PropertyKey;
