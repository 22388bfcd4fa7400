//! Typed native platform records.
//!
//! These mirror the platform's REST payloads field for field (snake_case names, signed
//! adjustments, numeric ids). Every optional field defaults when missing and unknown
//! fields are ignored, so the records tolerate the extra data different editions and
//! extensions attach. They never leave the crate's translation layer.
//!
//! Records whose presence depends on the deployment edition are grouped per edition:
//! [`rma`] exists only on the commerce edition, [`creditmemo`] on every edition.

#![allow(missing_docs, reason = "fields mirror the platform's REST payload names")]

use serde::{Deserialize, Deserializer};

pub mod creditmemo;
pub mod customer;
pub mod inventory;
pub mod order;
pub mod product;
pub mod rma;
pub mod shipment;

pub use creditmemo::{NativeCreditMemo, NativeCreditMemoItem};
pub use customer::{NativeCustomer, NativeCustomerAddress, NativeRegion};
pub use inventory::{NativeSourceItem, NativeStockItem};
pub use order::{NativeAddress, NativeOrder, NativeOrderItem};
pub use product::{
    NativeAttribute, NativeAttributeMetadata, NativeConfigurableOption, NativeOptionValue,
    NativeProduct,
};
pub use rma::{NativeRma, NativeRmaItem};
pub use shipment::{NativeShipment, NativeShipmentItem, NativeTrack};

/// List envelope of every search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult<T> {
    /// Records on the requested page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Total number of matching records.
    #[serde(default)]
    pub total_count: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(u64),
    Text(String),
}

/// Deserializes an id the platform sends either as a number or as a string.
pub(crate) fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(|id| match id {
        IdRepr::Number(n) => n.to_string(),
        IdRepr::Text(s) => s,
    }))
}
