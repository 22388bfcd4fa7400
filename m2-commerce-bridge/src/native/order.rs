//! Native order records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::opt_id;

/// Native order (`sales_order`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeOrder {
    #[serde(default, deserialize_with = "opt_id")]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub increment_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub store_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_firstname: Option<String>,
    #[serde(default)]
    pub customer_lastname: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub customer_group_id: Option<String>,
    #[serde(default)]
    pub order_currency_code: Option<String>,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    /// Stored negative.
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
    #[serde(default)]
    pub shipping_amount: Option<Decimal>,
    #[serde(default)]
    pub tax_amount: Option<Decimal>,
    #[serde(default)]
    pub grand_total: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub items: Vec<NativeOrderItem>,
    #[serde(default)]
    pub billing_address: Option<NativeAddress>,
    #[serde(default)]
    pub extension_attributes: Option<NativeOrderExtension>,
}

impl NativeOrder {
    /// Address of the first shipping assignment, if any.
    #[must_use]
    pub fn shipping_address(&self) -> Option<&NativeAddress> {
        self.extension_attributes
            .as_ref()?
            .shipping_assignments
            .first()?
            .shipping
            .as_ref()?
            .address
            .as_ref()
    }
}

/// Extension attributes of an order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeOrderExtension {
    #[serde(default)]
    pub shipping_assignments: Vec<NativeShippingAssignment>,
}

/// Shipping assignment of an order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeShippingAssignment {
    #[serde(default)]
    pub shipping: Option<NativeShipping>,
}

/// Shipping block of a shipping assignment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeShipping {
    #[serde(default)]
    pub address: Option<NativeAddress>,
    #[serde(default)]
    pub method: Option<String>,
}

/// Native order line (`sales_order_item`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeOrderItem {
    #[serde(default, deserialize_with = "opt_id")]
    pub item_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub parent_item_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub qty_ordered: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub row_total: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
    #[serde(default)]
    pub tax_amount: Option<Decimal>,
}

impl NativeOrderItem {
    /// Configurable parent rows duplicate their simple child.
    #[must_use]
    pub fn is_configurable_parent(&self) -> bool {
        self.product_type.as_deref() == Some("configurable")
    }
}

/// Native order address (`sales_order_address`); also the write shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NativeAddress {
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub street: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_shipping_address_from_first_assignment() {
        let order: NativeOrder = serde_json::from_value(json!({
            "entity_id": 5,
            "extension_attributes": {
                "shipping_assignments": [
                    {"shipping": {"address": {"city": "Austin"}, "method": "flatrate_flatrate"}},
                    {"shipping": {"address": {"city": "Dallas"}}}
                ]
            }
        }))
        .unwrap();

        assert_eq!(order.entity_id.as_deref(), Some("5"));
        assert_eq!(order.shipping_address().and_then(|a| a.city.as_deref()), Some("Austin"));
    }

    #[test]
    fn test_shipping_address_absent() {
        let order: NativeOrder =
            serde_json::from_value(json!({"extension_attributes": {}})).unwrap();
        assert!(order.shipping_address().is_none());
        assert!(NativeOrder::default().shipping_address().is_none());
    }

    #[test]
    fn test_order_amounts_from_numbers_and_strings() {
        let order: NativeOrder = serde_json::from_value(json!({
            "discount_amount": -12.5,
            "grand_total": "99.90"
        }))
        .unwrap();
        assert_eq!(order.discount_amount, Some(Decimal::new(-125, 1)));
        assert_eq!(order.grand_total, Some(Decimal::new(9990, 2)));
    }
}
