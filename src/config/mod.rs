//! Session configuration
//!
//! All behavior toggles live in plain data handed to the session when it is
//! built: category switches, soft-delete policy, value sourcing, and the
//! per-type tracking rules.

pub mod rules;
pub mod tracking;

pub use rules::{TrackingRules, TypeRules, MASKED_VALUE};
pub use tracking::{SoftDeletePolicy, TrackingConfig, ValueSource};
