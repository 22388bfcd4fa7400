//! Canonical return.
//!
//! A return is sourced either from a structured return authorization (RMA) or from a
//! credit memo. The two sources carry different detail: an RMA knows what was sent back
//! and how it was inspected, a credit memo only knows what money went back. The
//! [`ReturnDetails`] sum type keeps the subset that does not apply out of the payload
//! entirely, so the presence of `lineItems` versus `totalRefunded` already tells the
//! origin apart.

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::CustomField;

/// Native resource a return was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnOrigin {
    /// Return merchandise authorization.
    Rma,
    /// Credit memo (refund document).
    CreditMemo,
}

impl ReturnOrigin {
    /// Value stored in the `{namespace}_return_origin` custom field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rma => "rma",
            Self::CreditMemo => "credit_memo",
        }
    }
}

impl fmt::Display for ReturnOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Return {
    /// Stable id.
    pub id: String,
    /// Return or credit memo number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Order the return belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Resolution of the return (`refund`, `exchange`, ..., or `mixed`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    /// Origin-specific detail.
    #[serde(flatten)]
    pub details: ReturnDetails,
    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Platform data without a canonical field, including the origin tag.
    pub custom_fields: Vec<CustomField>,
    /// Tags.
    pub tags: BTreeSet<String>,
}

impl Return {
    /// Origin implied by the detail subset.
    #[must_use]
    pub const fn origin(&self) -> ReturnOrigin {
        match self.details {
            ReturnDetails::Inspection(_) => ReturnOrigin::Rma,
            ReturnDetails::Financial(_) => ReturnOrigin::CreditMemo,
        }
    }
}

/// Origin-specific return detail, flattened into the return payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReturnDetails {
    /// Per-line inspection detail of an RMA.
    Inspection(InspectionDetails),
    /// Aggregate financial detail of a credit memo.
    Financial(FinancialDetails),
}

/// Per-line detail of an RMA.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionDetails {
    /// Returned lines.
    pub line_items: Vec<ReturnLineItem>,
    /// Contact email given for the return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

/// Returned line of an RMA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLineItem {
    /// Line id.
    pub id: String,
    /// Order line id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_item_id: Option<String>,
    /// SKU.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Requested quantity.
    pub quantity: u32,
    /// Authorized quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_authorized: Option<u32>,
    /// Received quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_received: Option<u32>,
    /// Approved quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_approved: Option<u32>,
    /// Return reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Item condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Requested resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Line status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Aggregate refund detail of a credit memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDetails {
    /// Currency of all amounts.
    pub currency: String,
    /// Total refunded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_refunded: Option<Decimal>,
    /// Refunded subtotal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,
    /// Refunded shipping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_refunded: Option<Decimal>,
    /// Refunded tax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_refunded: Option<Decimal>,
    /// Adjustment refund.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_refund: Option<Decimal>,
    /// Adjustment fee, never negative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_fee: Option<Decimal>,
}
