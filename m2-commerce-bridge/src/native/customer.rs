//! Native customer records.

use serde::Deserialize;

use super::opt_id;

/// Native customer account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeCustomer {
    #[serde(default, deserialize_with = "opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub group_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub store_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub website_id: Option<String>,
    /// Id of the default billing address.
    #[serde(default, deserialize_with = "opt_id")]
    pub default_billing: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub addresses: Vec<NativeCustomerAddress>,
}

impl NativeCustomer {
    /// Default billing address, falling back to the one flagged `default_billing`.
    #[must_use]
    pub fn default_billing_address(&self) -> Option<&NativeCustomerAddress> {
        self.default_billing
            .as_deref()
            .and_then(|id| self.addresses.iter().find(|a| a.id.as_deref() == Some(id)))
            .or_else(|| self.addresses.iter().find(|a| a.default_billing == Some(true)))
    }
}

/// Address book entry. Unlike order addresses, the region is nested.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeCustomerAddress {
    #[serde(default, deserialize_with = "opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub street: Vec<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<NativeRegion>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country_id: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub default_billing: Option<bool>,
    #[serde(default)]
    pub default_shipping: Option<bool>,
}

/// Nested region of a customer address.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeRegion {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub region_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_billing_address_by_id() {
        let customer: NativeCustomer = serde_json::from_value(json!({
            "id": 3,
            "default_billing": "8",
            "addresses": [
                {"id": 7, "telephone": "111"},
                {"id": 8, "telephone": "222"}
            ]
        }))
        .unwrap();

        let billing = customer.default_billing_address().unwrap();
        assert_eq!(billing.telephone.as_deref(), Some("222"));
    }

    #[test]
    fn test_default_billing_address_by_flag() {
        let customer: NativeCustomer = serde_json::from_value(json!({
            "addresses": [
                {"id": 7, "telephone": "111"},
                {"id": 9, "telephone": "333", "default_billing": true}
            ]
        }))
        .unwrap();

        let billing = customer.default_billing_address().unwrap();
        assert_eq!(billing.telephone.as_deref(), Some("333"));
    }
}
