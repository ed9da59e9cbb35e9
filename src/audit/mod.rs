//! Audit log production
//!
//! Turns one dirty entry plus one event into a persistable log.
//!
//! # Architecture
//!
//! The pipeline has three stages:
//!
//! - `keys`: resolves a type's declared key properties and serializes the
//!   record id (`7` for a single key, `[oslo-1,SKU-9]` for composites).
//! - `DetailClassifier`: pairs the entry with its event and produces the
//!   before/after detail rows, honoring skip and mask rules.
//! - `assemble`: stitches id, attribution, metadata, and details into an
//!   [`crate::models::AuditLog`], or decides the change produces none.

pub mod assembler;
pub mod classifier;
pub mod keys;

pub use assembler::assemble;
pub use classifier::DetailClassifier;
pub use keys::{record_id, resolve_keys};
