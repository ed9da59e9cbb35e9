//! Primary-key resolution and record-id serialization

use crate::error::{AuditError, AuditResult};
use crate::models::PropertyKey;
use crate::tracker::{display_value, EntityEntry};

/// Resolve the declared key properties of an entry's type
///
/// Descriptors come back in declaration order, which is stable for every
/// instance of a type. A type that declares no keys cannot be audited.
pub fn resolve_keys(entry: &EntityEntry) -> AuditResult<Vec<PropertyKey>> {
    if entry.meta.key_properties.is_empty() {
        return Err(AuditError::key_not_found(entry.type_full_name()));
    }

    Ok(entry
        .meta
        .key_properties
        .iter()
        .map(|name| PropertyKey::new(name, entry.type_full_name()))
        .collect())
}

/// Serialize an entry's primary key into its record id
///
/// Key values prefer the originals, so modified and deleted records report
/// the identity they are stored under; additions have no originals and read
/// current values, which hold generated keys once the insert has committed.
/// A single key renders bare; composite keys render as `[v1,v2]` in declared
/// order. A key property that is absent or null is an error.
pub fn record_id(entry: &EntityEntry, keys: &[PropertyKey]) -> AuditResult<String> {
    let mut parts = Vec::with_capacity(keys.len());
    for key in keys {
        let value = entry
            .original_property(&key.property_name)
            .or_else(|| entry.property(&key.property_name))
            .and_then(display_value)
            .ok_or_else(|| AuditError::key_not_found(entry.type_full_name()))?;
        parts.push(value);
    }

    match parts.as_slice() {
        [single] => Ok(single.clone()),
        _ => Ok(format!("[{}]", parts.join(","))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{ChangeSet, EntityMeta, PropertyMap};
    use serde_json::json;

    fn stock_values(warehouse: &str, sku: &str) -> PropertyMap {
        let mut values = PropertyMap::new();
        values.insert("WarehouseId".to_string(), json!(warehouse));
        values.insert("Sku".to_string(), json!(sku));
        values.insert("Quantity".to_string(), json!(40));
        values
    }

    #[test]
    fn test_single_key_renders_bare() {
        let mut set = ChangeSet::new();
        let mut values = PropertyMap::new();
        values.insert("Id".to_string(), json!(7));
        let id = set.attach(EntityMeta::new("shop.Order", ["Id"]), values);
        let entry = set.entry(id).unwrap();

        let keys = resolve_keys(entry).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].property_name, "Id");
        assert_eq!(record_id(entry, &keys).unwrap(), "7");
    }

    #[test]
    fn test_composite_key_renders_bracketed_in_declared_order() {
        let mut set = ChangeSet::new();
        let id = set.attach(
            EntityMeta::new("warehouse.Stock", ["WarehouseId", "Sku"]),
            stock_values("oslo-1", "SKU-9"),
        );
        let entry = set.entry(id).unwrap();

        let keys = resolve_keys(entry).unwrap();
        assert_eq!(record_id(entry, &keys).unwrap(), "[oslo-1,SKU-9]");
    }

    #[test]
    fn test_key_prefers_original_value() {
        let mut set = ChangeSet::new();
        let mut values = PropertyMap::new();
        values.insert("Id".to_string(), json!(7));
        let id = set.attach(EntityMeta::new("shop.Order", ["Id"]), values);
        set.set_property(id, "Id", json!(8));
        let entry = set.entry(id).unwrap();

        let keys = resolve_keys(entry).unwrap();
        assert_eq!(record_id(entry, &keys).unwrap(), "7");
    }

    #[test]
    fn test_type_without_keys_is_an_error() {
        let mut set = ChangeSet::new();
        let id = set.attach(
            EntityMeta::new("shop.ImportRow", Vec::<String>::new()),
            PropertyMap::new(),
        );
        let entry = set.entry(id).unwrap();

        let err = resolve_keys(entry).unwrap_err();
        assert_eq!(err.to_string(), "key not found for shop.ImportRow");
    }

    #[test]
    fn test_missing_key_property_is_an_error() {
        let mut set = ChangeSet::new();
        let mut values = PropertyMap::new();
        values.insert("Name".to_string(), json!("widget"));
        let id = set.attach(EntityMeta::new("shop.Product", ["Id"]), values);
        let entry = set.entry(id).unwrap();

        let keys = resolve_keys(entry).unwrap();
        let err = record_id(entry, &keys).unwrap_err();
        assert!(err.is_key_not_found());
    }
}
