//! Return authorization records (commerce edition only).

use rust_decimal::Decimal;
use serde::Deserialize;

use super::opt_id;

/// Native RMA.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeRma {
    #[serde(default, deserialize_with = "opt_id")]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub increment_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub order_increment_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub store_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_custom_email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date_requested: Option<String>,
    #[serde(default)]
    pub items: Vec<NativeRmaItem>,
}

/// Line of an RMA.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeRmaItem {
    #[serde(default, deserialize_with = "opt_id")]
    pub entity_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub order_item_id: Option<String>,
    #[serde(default)]
    pub product_sku: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub qty_requested: Option<Decimal>,
    #[serde(default)]
    pub qty_authorized: Option<Decimal>,
    #[serde(default)]
    pub qty_returned: Option<Decimal>,
    #[serde(default)]
    pub qty_approved: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_id")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub resolution: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
