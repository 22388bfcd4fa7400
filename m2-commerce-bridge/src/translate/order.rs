//! Order translation.
//!
//! The platform lists a configurable purchase twice: a `configurable` parent row holding
//! the price and a `simple` child row naming the concrete SKU. Only the child becomes a
//! canonical line; when it carries no price of its own it takes the parent's amounts.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};

use super::common::{
    address_to_native, magnitude, native_id, non_blank, order_address_to_canonical,
    parse_timestamp, push_field, quantity, to_payload,
};
use crate::{
    config::FieldNamespace,
    error::{BridgeError, Result},
    models::{Address, Order, OrderCustomer, OrderDraft, OrderLineItem},
    native::{NativeAddress, NativeOrder, NativeOrderItem},
};

/// Translates a native order.
#[must_use]
pub fn to_canonical(native: &NativeOrder, ns: &FieldNamespace, include_line_items: bool) -> Order {
    let mut custom_fields = Vec::new();
    push_field(&mut custom_fields, ns, "state", native.state.as_deref());
    push_field(&mut custom_fields, ns, "status", native.status.as_deref());
    push_field(&mut custom_fields, ns, "store_id", native.store_id.as_deref());
    push_field(&mut custom_fields, ns, "customer_group_id", native.customer_group_id.as_deref());
    let shipping_method = native
        .extension_attributes
        .as_ref()
        .and_then(|ext| ext.shipping_assignments.first())
        .and_then(|assignment| assignment.shipping.as_ref())
        .and_then(|shipping| shipping.method.as_deref());
    push_field(&mut custom_fields, ns, "shipping_method", shipping_method);

    Order {
        id: native.entity_id.clone().unwrap_or_default(),
        external_id: native.increment_id.clone(),
        name: native.increment_id.as_deref().map(|number| format!("#{number}")),
        status: native.status.clone(),
        currency: native.order_currency_code.clone(),
        customer: customer(native),
        billing_address: native.billing_address.as_ref().and_then(order_address_to_canonical),
        shipping_address: native.shipping_address().and_then(order_address_to_canonical),
        line_items: include_line_items.then(|| line_items(&native.items, ns)),
        subtotal_price: native.subtotal,
        order_discount: magnitude(native.discount_amount),
        shipping_price: native.shipping_amount,
        total_tax: native.tax_amount,
        total_price: native.grand_total,
        created_at: parse_timestamp(native.created_at.as_deref()),
        updated_at: parse_timestamp(native.updated_at.as_deref()),
        custom_fields,
        tags: BTreeSet::new(),
    }
}

fn customer(native: &NativeOrder) -> Option<OrderCustomer> {
    let customer = OrderCustomer {
        id: native.customer_id.clone(),
        email: non_blank(native.customer_email.as_deref()),
        first_name: non_blank(native.customer_firstname.as_deref()),
        last_name: non_blank(native.customer_lastname.as_deref()),
    };
    if customer == OrderCustomer::default() { None } else { Some(customer) }
}

fn line_items(items: &[NativeOrderItem], ns: &FieldNamespace) -> Vec<OrderLineItem> {
    let parents: HashMap<&str, &NativeOrderItem> = items
        .iter()
        .filter(|item| item.is_configurable_parent())
        .filter_map(|item| item.item_id.as_deref().map(|id| (id, item)))
        .collect();

    items
        .iter()
        .filter(|item| !item.is_configurable_parent())
        .map(|item| {
            let parent = item.parent_item_id.as_deref().and_then(|id| parents.get(id).copied());
            line_item(item, parent, ns)
        })
        .collect()
}

fn line_item(
    item: &NativeOrderItem,
    parent: Option<&NativeOrderItem>,
    ns: &FieldNamespace,
) -> OrderLineItem {
    let unpriced = item.price.is_none_or(|price| price.is_zero());
    let source = match parent {
        Some(parent) if unpriced => parent,
        _ => item,
    };

    let mut custom_fields = Vec::new();
    push_field(&mut custom_fields, ns, "product_type", item.product_type.as_deref());
    if let Some(parent) = parent {
        push_field(&mut custom_fields, ns, "parent_sku", parent.sku.as_deref());
    }

    OrderLineItem {
        id: item.item_id.clone().unwrap_or_default(),
        sku: item.sku.clone(),
        name: item.name.clone(),
        quantity: quantity(item.qty_ordered),
        unit_price: source.price,
        total_price: source.row_total,
        discount: magnitude(source.discount_amount),
        tax: source.tax_amount,
        product_id: item.product_id.clone(),
        custom_fields,
    }
}

#[derive(Debug, Serialize)]
struct OrderEntity {
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<Value>,
    customer_is_guest: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_group_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_id: Option<Value>,
    order_currency_code: String,
    base_currency_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    items: Vec<OrderItemEntity>,
    subtotal: Decimal,
    grand_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    billing_address: Option<NativeAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extension_attributes: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    status_histories: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct OrderItemEntity {
    sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    product_type: &'static str,
    qty_ordered: u32,
    price: Decimal,
    row_total: Decimal,
}

/// Builds the `POST /orders` body for a draft.
///
/// Namespaced custom fields named `state`, `store_id` and `customer_group_id` map back
/// onto their native columns; tags are recorded as an order comment since the platform
/// has no tag storage.
///
/// # Errors
///
/// Returns [`BridgeError::Validation`] when the draft has no lines or a zero quantity.
pub fn draft_to_native(draft: &OrderDraft, ns: &FieldNamespace, default_currency: &str) -> Result<Value> {
    if draft.line_items.is_empty() {
        return Err(BridgeError::Validation("order draft needs at least one line item".to_owned()));
    }
    if let Some(line) = draft.line_items.iter().find(|line| line.quantity == 0) {
        return Err(BridgeError::Validation(format!("line item {} has zero quantity", line.sku)));
    }

    let items: Vec<OrderItemEntity> = draft
        .line_items
        .iter()
        .map(|line| {
            let price = line.unit_price.unwrap_or_default();
            OrderItemEntity {
                sku: line.sku.clone(),
                name: line.name.clone(),
                product_type: "simple",
                qty_ordered: line.quantity,
                price,
                row_total: price * Decimal::from(line.quantity),
            }
        })
        .collect();
    let subtotal: Decimal = items.iter().map(|item| item.row_total).sum();

    let custom = |key: &str| {
        let name = ns.name(key);
        draft.custom_fields.iter().find(|f| f.name == name).map(|f| f.value.as_str())
    };

    let customer = draft.customer.clone().unwrap_or_default();
    let currency = draft.currency.clone().unwrap_or_else(|| default_currency.to_owned());

    let extension_attributes = draft.shipping_address.as_ref().map(|address| {
        let mut shipping = json!({ "address": address_to_native(address, "shipping") });
        if let Some(method) = &draft.shipping_method {
            shipping["method"] = Value::String(method.clone());
        }
        json!({ "shipping_assignments": [{ "shipping": shipping }] })
    });

    let status_histories = if draft.tags.is_empty() {
        Vec::new()
    } else {
        let tags = draft.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        vec![json!({ "comment": format!("Tags: {tags}"), "is_visible_on_front": 0 })]
    };

    let entity = OrderEntity {
        customer_id: customer.id.as_deref().map(native_id),
        customer_is_guest: u8::from(customer.id.is_none()),
        customer_email: customer.email,
        customer_firstname: customer.first_name,
        customer_lastname: customer.last_name,
        customer_group_id: custom("customer_group_id").map(native_id),
        store_id: custom("store_id").map(native_id),
        base_currency_code: currency.clone(),
        order_currency_code: currency,
        state: custom("state").map(str::to_owned),
        status: draft.status.clone(),
        items,
        subtotal,
        grand_total: subtotal,
        billing_address: draft
            .billing_address
            .as_ref()
            .map(|address| address_to_native(address, "billing")),
        extension_attributes,
        status_histories,
    };

    Ok(json!({ "entity": to_payload(&entity)? }))
}

/// Builds the `PUT /orders/{id}` body replacing one order address.
///
/// `existing` is the address being replaced; its id tells the platform which row to
/// update.
///
/// # Errors
///
/// Returns error if the payload cannot be encoded.
pub fn address_update_to_native(
    order_id: &str,
    address: &Address,
    address_type: &str,
    existing: Option<&NativeAddress>,
) -> Result<Value> {
    let mut native = address_to_native(address, address_type);
    native.parent_id = Some(order_id.to_owned());
    native.entity_id = existing.and_then(|a| a.entity_id.clone());
    native.email = existing.and_then(|a| a.email.clone());
    Ok(json!({ "entity": to_payload(&native)? }))
}

/// Builds the `POST /orders/{id}/comments` body.
#[must_use]
pub fn comment_to_native(
    order_id: &str,
    comment: &str,
    status: Option<&str>,
    notify_customer: bool,
) -> Value {
    let mut history = json!({
        "comment": comment,
        "parent_id": native_id(order_id),
        "is_customer_notified": u8::from(notify_customer),
        "is_visible_on_front": 0,
    });
    if let Some(status) = status {
        history["status"] = Value::String(status.to_owned());
    }
    json!({ "statusHistory": history })
}

#[cfg(test)]
#[allow(
    clippy::unreachable,
    reason = "test code uses unreachable for expected-path assertions"
)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::{CustomField, OrderLineItemDraft};

    fn native(value: Value) -> NativeOrder {
        serde_json::from_value(value).unwrap()
    }

    fn configurable_order() -> NativeOrder {
        native(json!({
            "entity_id": 12,
            "increment_id": "000000012",
            "state": "processing",
            "status": "processing",
            "store_id": 1,
            "order_currency_code": "USD",
            "subtotal": 45,
            "discount_amount": -12.5,
            "grand_total": 37.5,
            "created_at": "2024-05-01 10:00:00",
            "items": [
                {"item_id": 1, "sku": "MH01-XS-Black", "name": "Hoodie", "product_type": "configurable",
                 "qty_ordered": 1, "price": 45, "row_total": 45, "discount_amount": 12.5},
                {"item_id": 2, "parent_item_id": 1, "sku": "MH01-XS-Black", "name": "Hoodie-XS-Black",
                 "product_type": "simple", "qty_ordered": 1, "price": 0, "row_total": 0}
            ],
            "billing_address": {"firstname": "Ada", "city": "Austin", "street": ["1 Main St"]}
        }))
    }

    #[test]
    fn test_configurable_parent_excluded() {
        let order = to_canonical(&configurable_order(), &FieldNamespace::default(), true);
        let lines = order.line_items.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, "2");
        assert_eq!(lines[0].quantity, 1);
    }

    #[test]
    fn test_child_inherits_parent_price() {
        let order = to_canonical(&configurable_order(), &FieldNamespace::default(), true);
        let line = &order.line_items.unwrap()[0];
        assert_eq!(line.unit_price, Some(Decimal::new(45, 0)));
        assert_eq!(line.total_price, Some(Decimal::new(45, 0)));
        assert_eq!(line.discount, Some(Decimal::new(125, 1)));
        assert!(line.custom_fields.contains(&CustomField {
            name: "m2_product_type".to_owned(),
            value: "simple".to_owned()
        }));
    }

    #[test]
    fn test_discount_is_magnitude() {
        let order = to_canonical(&configurable_order(), &FieldNamespace::default(), false);
        assert_eq!(order.order_discount, Some(Decimal::new(125, 1)));
    }

    #[test]
    fn test_line_items_absent_when_not_requested() {
        let order = to_canonical(&configurable_order(), &FieldNamespace::default(), false);
        assert!(order.line_items.is_none());
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("lineItems").is_none());
    }

    #[test]
    fn test_order_fields_and_custom_fields() {
        let order = to_canonical(&configurable_order(), &FieldNamespace::new("acme"), true);
        assert_eq!(order.id, "12");
        assert_eq!(order.external_id.as_deref(), Some("000000012"));
        assert_eq!(order.name.as_deref(), Some("#000000012"));
        assert!(order.created_at.is_some());
        assert!(order.tags.is_empty());

        let names: Vec<&str> = order.custom_fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["acme_state", "acme_status", "acme_store_id"]);
    }

    #[test]
    fn test_shipping_address_omitted_without_assignments() {
        let order = to_canonical(&configurable_order(), &FieldNamespace::default(), true);
        assert!(order.shipping_address.is_none());
        assert_eq!(
            order.billing_address.and_then(|a| a.city),
            Some("Austin".to_owned())
        );

        let json = serde_json::to_value(
            to_canonical(&configurable_order(), &FieldNamespace::default(), true),
        )
        .unwrap();
        assert!(json.get("shippingAddress").is_none());
    }

    #[test]
    fn test_shipping_address_from_assignment() {
        let order = to_canonical(
            &native(json!({
                "entity_id": 3,
                "extension_attributes": {"shipping_assignments": [
                    {"shipping": {"address": {"city": "Denver"}, "method": "flatrate_flatrate"}}
                ]}
            })),
            &FieldNamespace::default(),
            true,
        );
        assert_eq!(order.shipping_address.and_then(|a| a.city), Some("Denver".to_owned()));
        assert!(order.custom_fields.iter().any(|f| f.name == "m2_shipping_method"));
        assert!(order.customer.is_none());
    }

    #[test]
    fn test_draft_to_native() {
        let draft = OrderDraft {
            customer: Some(OrderCustomer {
                email: Some("ada@example.com".to_owned()),
                ..OrderCustomer::default()
            }),
            line_items: vec![OrderLineItemDraft {
                sku: "MB01".to_owned(),
                name: None,
                quantity: 2,
                unit_price: Some(Decimal::new(1050, 2)),
            }],
            custom_fields: vec![CustomField { name: "m2_store_id".to_owned(), value: "1".to_owned() }],
            tags: ["vip".to_owned()].into(),
            ..OrderDraft::default()
        };

        let body = draft_to_native(&draft, &FieldNamespace::default(), "EUR").unwrap();
        let entity = &body["entity"];
        assert_eq!(entity["customer_is_guest"], 1);
        assert_eq!(entity["order_currency_code"], "EUR");
        assert_eq!(entity["store_id"], 1);
        assert_eq!(entity["items"][0]["qty_ordered"], 2);
        assert_eq!(entity["items"][0]["row_total"], json!("21.00"));
        assert_eq!(entity["status_histories"][0]["comment"], "Tags: vip");
        assert!(entity.get("extension_attributes").is_none());
    }

    #[test]
    fn test_draft_without_lines_is_rejected() {
        let Err(BridgeError::Validation(msg)) =
            draft_to_native(&OrderDraft::default(), &FieldNamespace::default(), "USD")
        else {
            unreachable!("expected Validation")
        };
        assert!(msg.contains("at least one line item"));
    }

    #[test]
    fn test_comment_to_native() {
        let body = comment_to_native("12", "Customer called", Some("holded"), true);
        assert_eq!(body["statusHistory"]["parent_id"], 12);
        assert_eq!(body["statusHistory"]["is_customer_notified"], 1);
        assert_eq!(body["statusHistory"]["status"], "holded");
    }
}
