//! Canonical commerce data models.
//!
//! These are the platform-neutral shapes every operation returns. They serialize with
//! camelCase names and omit absent optional fields entirely instead of emitting `null`.
//! Native platform shapes live in [`crate::native`] and never cross the translation
//! boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod customer;
pub mod fulfillment;
pub mod order;
pub mod params;
pub mod returns;

pub use catalog::{
    InventoryRecord, Product, ProductOption, SelectedOption, Variant,
};
pub use customer::Customer;
pub use fulfillment::{Fulfillment, FulfillmentLineItem, TrackingInfo};
pub use order::{Order, OrderCustomer, OrderLineItem};
pub use params::*;
pub use returns::{
    FinancialDetails, InspectionDetails, Return, ReturnDetails, ReturnLineItem, ReturnOrigin,
};

/// Namespaced custom field carrying platform data with no canonical equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    /// Field name, prefixed with the vendor namespace.
    pub name: String,
    /// Field value.
    pub value: String,
}

/// Monetary amount with its currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Amount.
    pub amount: Decimal,
    /// Currency code (ISO 4217).
    pub currency_code: String,
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Recipient first name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Recipient last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Company.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// First street line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    /// Second street line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Region name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// Region code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province_code: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Country code (ISO 3166-1 alpha-2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
