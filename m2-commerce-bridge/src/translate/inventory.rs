//! Inventory translation.

use std::collections::BTreeSet;

use super::common::push_field;
use crate::{
    config::FieldNamespace,
    models::InventoryRecord,
    native::{NativeSourceItem, NativeStockItem},
};

/// Translates a multi-source stock entry.
#[must_use]
pub fn source_item_to_canonical(native: &NativeSourceItem, ns: &FieldNamespace) -> InventoryRecord {
    let sku = native.sku.clone().unwrap_or_default();
    let location = native.source_code.clone();

    let mut custom_fields = vec![ns.field("inventory_source", "source_item")];
    if let Some(status) = native.status {
        custom_fields.push(ns.field("source_item_status", status.to_string()));
    }

    InventoryRecord {
        id: record_id(&sku, location.as_deref()),
        external_id: None,
        sku,
        location_id: location,
        quantity: native.quantity,
        available: native.status.map(|status| status == 1),
        created_at: None,
        updated_at: None,
        custom_fields,
        tags: BTreeSet::new(),
    }
}

/// Translates a legacy single-stock entry; the record itself does not name its SKU.
#[must_use]
pub fn stock_item_to_canonical(
    sku: &str,
    native: &NativeStockItem,
    ns: &FieldNamespace,
) -> InventoryRecord {
    let location = native.stock_id.clone();

    let mut custom_fields = vec![ns.field("inventory_source", "stock_item")];
    push_field(&mut custom_fields, ns, "product_id", native.product_id.as_deref());

    InventoryRecord {
        id: record_id(sku, location.as_deref()),
        external_id: native.item_id.clone(),
        sku: sku.to_owned(),
        location_id: location,
        quantity: native.qty,
        available: native.is_in_stock,
        created_at: None,
        updated_at: None,
        custom_fields,
        tags: BTreeSet::new(),
    }
}

fn record_id(sku: &str, location: Option<&str>) -> String {
    match location {
        Some(location) => format!("{sku}:{location}"),
        None => sku.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_source_item() {
        let native: NativeSourceItem = serde_json::from_value(json!({
            "sku": "MB01", "source_code": "warehouse_east", "quantity": 14, "status": 1
        }))
        .unwrap();

        let record = source_item_to_canonical(&native, &FieldNamespace::default());
        assert_eq!(record.id, "MB01:warehouse_east");
        assert_eq!(record.quantity, Some(Decimal::new(14, 0)));
        assert_eq!(record.available, Some(true));
        assert_eq!(record.custom_fields[0].value, "source_item");
    }

    #[test]
    fn test_stock_item() {
        let native: NativeStockItem = serde_json::from_value(json!({
            "item_id": 5, "product_id": 5, "stock_id": 1, "qty": 0, "is_in_stock": false
        }))
        .unwrap();

        let record = stock_item_to_canonical("MB01", &native, &FieldNamespace::default());
        assert_eq!(record.id, "MB01:1");
        assert_eq!(record.external_id.as_deref(), Some("5"));
        assert_eq!(record.location_id.as_deref(), Some("1"));
        assert_eq!(record.available, Some(false));
        assert_eq!(record.custom_fields[0].value, "stock_item");
    }

    #[test]
    fn test_missing_quantity_is_omitted() {
        let native: NativeStockItem =
            serde_json::from_value(json!({"item_id": 5, "stock_id": 1, "is_in_stock": true})).unwrap();

        let record = stock_item_to_canonical("MB01", &native, &FieldNamespace::default());
        assert!(record.quantity.is_none());
        assert!(serde_json::to_value(&record).unwrap().get("quantity").is_none());
    }
}
