//! Canonical fulfillment.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CustomField;

/// Shipment of (part of) an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fulfillment {
    /// Stable id.
    pub id: String,
    /// Shipment number on the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Order id.
    pub order_id: String,
    /// Shipped lines.
    #[serde(default)]
    pub line_items: Vec<FulfillmentLineItem>,
    /// Tracking numbers, in the order they were added.
    #[serde(default)]
    pub tracking_numbers: Vec<String>,
    /// Carrier detail per tracking number.
    #[serde(default)]
    pub tracking_info: Vec<TrackingInfo>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Platform data without a canonical field.
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    /// Tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// Shipped line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentLineItem {
    /// Order line id.
    pub line_item_id: String,
    /// SKU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Shipped quantity.
    pub quantity: u32,
}

/// Tracking detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    /// Tracking number.
    pub number: String,
    /// Carrier code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    /// Carrier or service title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
