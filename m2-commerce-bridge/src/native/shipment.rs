//! Native shipment records.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::opt_id;

/// Native shipment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeShipment {
    #[serde(default, deserialize_with = "opt_id")]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub increment_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub store_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub items: Vec<NativeShipmentItem>,
    #[serde(default)]
    pub tracks: Vec<NativeTrack>,
}

/// Shipped line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeShipmentItem {
    #[serde(default, deserialize_with = "opt_id")]
    pub entity_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub order_item_id: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub qty: Option<Decimal>,
}

/// Shipment track.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeTrack {
    #[serde(default)]
    pub track_number: Option<String>,
    #[serde(default)]
    pub carrier_code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}
