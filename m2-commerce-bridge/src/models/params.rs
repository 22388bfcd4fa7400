//! Operation parameters and write drafts.
//!
//! Every type deserializes from camelCase JSON. Query parameters flatten the shared
//! [`QueryWindow`] so temporal bounds and paging sit next to the entity filters.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{Address, CustomField, OrderCustomer};
use crate::criteria::QueryWindow;

/// Parameters of `get-orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOrdersParams {
    /// Order ids.
    #[serde(default)]
    pub ids: Vec<String>,
    /// Order numbers.
    #[serde(default)]
    pub external_ids: Vec<String>,
    /// Statuses.
    #[serde(default)]
    pub statuses: Vec<String>,
    /// Display names; orders are named after their number.
    #[serde(default)]
    pub names: Vec<String>,
    /// Whether to translate line items (default `true`).
    #[serde(default = "default_true")]
    pub include_line_items: bool,
    /// Temporal bounds and paging.
    #[serde(flatten)]
    pub window: QueryWindow,
}

impl Default for GetOrdersParams {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            external_ids: Vec::new(),
            statuses: Vec::new(),
            names: Vec::new(),
            include_line_items: true,
            window: QueryWindow::default(),
        }
    }
}

/// Parameters of `get-customers`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCustomersParams {
    /// Customer ids.
    #[serde(default)]
    pub ids: Vec<String>,
    /// Emails.
    #[serde(default)]
    pub emails: Vec<String>,
    /// Temporal bounds and paging.
    #[serde(flatten)]
    pub window: QueryWindow,
}

/// Parameters of `get-products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductsParams {
    /// Product ids.
    #[serde(default)]
    pub ids: Vec<String>,
    /// SKUs.
    #[serde(default)]
    pub skus: Vec<String>,
    /// Temporal bounds and paging.
    #[serde(flatten)]
    pub window: QueryWindow,
}

/// Parameters of `get-product-variants`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProductVariantsParams {
    /// Variant ids.
    #[serde(default)]
    pub ids: Vec<String>,
    /// Variant SKUs.
    #[serde(default)]
    pub skus: Vec<String>,
    /// Parent product ids; switches to per-parent resolution.
    #[serde(default)]
    pub product_ids: Vec<String>,
    /// Temporal bounds and paging.
    #[serde(flatten)]
    pub window: QueryWindow,
}

/// Parameters of `get-inventory`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetInventoryParams {
    /// SKUs; must not be empty.
    #[serde(default)]
    pub skus: Vec<String>,
    /// Location (source) codes.
    #[serde(default)]
    pub location_ids: Vec<String>,
}

/// Parameters of `get-fulfillments`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFulfillmentsParams {
    /// Shipment ids.
    #[serde(default)]
    pub ids: Vec<String>,
    /// Order ids.
    #[serde(default)]
    pub order_ids: Vec<String>,
    /// Temporal bounds and paging.
    #[serde(flatten)]
    pub window: QueryWindow,
}

/// Parameters of `get-returns`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetReturnsParams {
    /// Return ids.
    #[serde(default)]
    pub ids: Vec<String>,
    /// Order ids.
    #[serde(default)]
    pub order_ids: Vec<String>,
    /// Return numbers.
    #[serde(default)]
    pub return_numbers: Vec<String>,
    /// Statuses.
    #[serde(default)]
    pub statuses: Vec<String>,
    /// Outcomes, matched after translation.
    #[serde(default)]
    pub outcomes: Vec<String>,
    /// Temporal bounds and paging.
    #[serde(flatten)]
    pub window: QueryWindow,
}

/// Line of a new order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItemDraft {
    /// SKU.
    pub sku: String,
    /// Name.
    #[serde(default)]
    pub name: Option<String>,
    /// Quantity.
    pub quantity: u32,
    /// Unit price.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

/// Input of `create-order`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    /// Customer placing the order; guest when absent or without id.
    #[serde(default)]
    pub customer: Option<OrderCustomer>,
    /// Currency; the configured default when absent.
    #[serde(default)]
    pub currency: Option<String>,
    /// Lines.
    #[serde(default)]
    pub line_items: Vec<OrderLineItemDraft>,
    /// Billing address.
    #[serde(default)]
    pub billing_address: Option<Address>,
    /// Shipping address.
    #[serde(default)]
    pub shipping_address: Option<Address>,
    /// Shipping method code.
    #[serde(default)]
    pub shipping_method: Option<String>,
    /// Initial status.
    #[serde(default)]
    pub status: Option<String>,
    /// Custom fields; namespaced ones map back onto native fields.
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    /// Tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// Partial update of an order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    /// Replacement billing address.
    #[serde(default)]
    pub billing_address: Option<Address>,
    /// Replacement shipping address.
    #[serde(default)]
    pub shipping_address: Option<Address>,
    /// New status, recorded through a status history entry.
    #[serde(default)]
    pub status: Option<String>,
    /// Note added to the order history.
    #[serde(default)]
    pub notes: Option<String>,
    /// Whether the customer is notified of the history entry.
    #[serde(default)]
    pub notify_customer: bool,
}

impl OrderUpdate {
    /// Returns `true` when the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.billing_address.is_none()
            && self.shipping_address.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }
}

/// Input of `update-order`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderParams {
    /// Order id.
    pub id: String,
    /// Fields to change.
    #[serde(default)]
    pub updates: OrderUpdate,
}

/// Input of `cancel-order`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderParams {
    /// Order id.
    pub order_id: String,
    /// Cancellation reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Additional notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Whether the customer is notified.
    #[serde(default)]
    pub notify_customer: bool,
}

/// Line to ship.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillLineItem {
    /// Order line id.
    pub line_item_id: String,
    /// Quantity to ship.
    pub quantity: u32,
}

/// Input of `fulfill-order`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillOrderParams {
    /// Order id.
    pub order_id: String,
    /// Lines to ship; all remaining lines when empty.
    #[serde(default)]
    pub line_items: Vec<FulfillLineItem>,
    /// Tracking numbers.
    #[serde(default)]
    pub tracking_numbers: Vec<String>,
    /// Carrier code (`ups`, `fedex`, `custom`, ...).
    #[serde(default)]
    pub shipping_carrier: Option<String>,
    /// Carrier or service title.
    #[serde(default)]
    pub shipping_method: Option<String>,
    /// Comment attached to the shipment.
    #[serde(default)]
    pub notes: Option<String>,
    /// Whether the customer is notified.
    #[serde(default)]
    pub notify_customer: bool,
}

/// Line of a new return.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLineItemDraft {
    /// Order line id.
    pub line_item_id: String,
    /// Quantity returned.
    pub quantity: u32,
    /// Return reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Item condition.
    #[serde(default)]
    pub condition: Option<String>,
    /// Requested resolution.
    #[serde(default)]
    pub resolution: Option<String>,
}

/// Input of `create-return`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnDraft {
    /// Order id.
    pub order_id: String,
    /// Returned lines.
    pub line_items: Vec<ReturnLineItemDraft>,
    /// Contact email for the return.
    #[serde(default)]
    pub customer_email: Option<String>,
    /// Comment attached to the return.
    #[serde(default)]
    pub notes: Option<String>,
    /// Shipping amount to refund (credit memo only).
    #[serde(default)]
    pub refund_shipping: Option<Decimal>,
    /// Extra amount to refund (credit memo only).
    #[serde(default)]
    pub adjustment_refund: Option<Decimal>,
    /// Fee withheld from the refund (credit memo only).
    #[serde(default)]
    pub adjustment_fee: Option<Decimal>,
    /// Whether the customer is notified.
    #[serde(default)]
    pub notify_customer: bool,
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_get_orders_params_from_camel_case() {
        let params: GetOrdersParams = serde_json::from_value(json!({
            "externalIds": ["000000012"],
            "includeLineItems": false,
            "createdAtMin": "2024-01-01",
            "skip": 20,
            "pageSize": 10
        }))
        .unwrap();

        assert_eq!(params.external_ids, ["000000012"]);
        assert!(!params.include_line_items);
        assert!(params.ids.is_empty());
        assert_eq!(params.window.created_at_min.as_deref(), Some("2024-01-01"));
        assert_eq!(params.window.skip, Some(20));
    }

    #[test]
    fn test_get_orders_params_include_line_items_defaults_to_true() {
        let params: GetOrdersParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.include_line_items);
        assert!(GetOrdersParams::default().include_line_items);
    }

    #[test]
    fn test_return_draft_requires_order_and_lines() {
        assert!(serde_json::from_value::<ReturnDraft>(json!({"orderId": "7"})).is_err());

        let draft: ReturnDraft = serde_json::from_value(json!({
            "orderId": "7",
            "lineItems": [{"lineItemId": "11", "quantity": 1, "reason": "damaged"}],
            "refundShipping": "5.00"
        }))
        .unwrap();
        assert_eq!(draft.line_items[0].reason.as_deref(), Some("damaged"));
        assert_eq!(draft.refund_shipping, Some(Decimal::new(500, 2)));
    }

    #[test]
    fn test_order_update_is_empty() {
        assert!(OrderUpdate::default().is_empty());
        let update = OrderUpdate { notes: Some("gift wrap".to_owned()), ..Default::default() };
        assert!(!update.is_empty());
    }
}
