//! In-memory unit of work and dirty-state tracking
//!
//! This module is the engine's view of the caller's pending changes: which
//! records were inserted, edited, or removed since the last save, together
//! with the original values needed to diff them.

pub mod change_set;
pub mod entry;
pub mod value;

pub use change_set::ChangeSet;
pub use entry::{EntityEntry, EntityMeta, EntryId, EntryState};
pub use value::{display_value, PropertyMap};
