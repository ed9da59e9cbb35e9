//! Property descriptors used during key resolution

use serde::{Deserialize, Serialize};

/// A primary-key property of a declared record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyKey {
    /// Name of the key property
    pub property_name: String,

    /// Full name of the declaring type
    pub type_full_name: String,
}

impl PropertyKey {
    pub fn new(property_name: impl Into<String>, type_full_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            type_full_name: type_full_name.into(),
        }
    }
}
