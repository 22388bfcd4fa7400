//! Credit memo records (every edition).

use rust_decimal::Decimal;
use serde::Deserialize;

use super::opt_id;

/// Native credit memo.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeCreditMemo {
    #[serde(default, deserialize_with = "opt_id")]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub increment_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub store_id: Option<String>,
    /// `1` open, `2` refunded, `3` canceled.
    #[serde(default)]
    pub state: Option<u8>,
    #[serde(default)]
    pub order_currency_code: Option<String>,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default)]
    pub shipping_amount: Option<Decimal>,
    #[serde(default)]
    pub tax_amount: Option<Decimal>,
    #[serde(default)]
    pub adjustment_positive: Option<Decimal>,
    #[serde(default)]
    pub adjustment_negative: Option<Decimal>,
    #[serde(default)]
    pub grand_total: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub items: Vec<NativeCreditMemoItem>,
}

/// Refunded line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeCreditMemoItem {
    #[serde(default, deserialize_with = "opt_id")]
    pub entity_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub order_item_id: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub qty: Option<Decimal>,
    #[serde(default)]
    pub row_total: Option<Decimal>,
}
