//! Native stock records.
//!
//! Multi-source deployments expose per-source items; the legacy single-stock module
//! exposes one stock item per product.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::opt_id;

/// Per-source stock (`/inventory/source-items`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeSourceItem {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub source_code: Option<String>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    /// `1` in stock, `0` out of stock.
    #[serde(default)]
    pub status: Option<u8>,
}

/// Legacy stock item (`/stockItems/{sku}`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeStockItem {
    #[serde(default, deserialize_with = "opt_id")]
    pub item_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub stock_id: Option<String>,
    #[serde(default)]
    pub qty: Option<Decimal>,
    #[serde(default)]
    pub is_in_stock: Option<bool>,
}
