//! Native catalog records.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::{NativeStockItem, opt_id};

/// Native product (simple or configurable).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeProduct {
    #[serde(default, deserialize_with = "opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub type_id: Option<String>,
    /// `1` enabled, `2` disabled.
    #[serde(default)]
    pub status: Option<u8>,
    #[serde(default)]
    pub visibility: Option<u8>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_id")]
    pub attribute_set_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub extension_attributes: Option<NativeProductExtension>,
    #[serde(default)]
    pub custom_attributes: Vec<NativeAttribute>,
}

impl NativeProduct {
    /// Value of a custom attribute rendered as text.
    #[must_use]
    pub fn attribute(&self, code: &str) -> Option<String> {
        self.custom_attributes
            .iter()
            .find(|attr| attr.attribute_code == code)
            .and_then(NativeAttribute::text)
    }

    /// Declared configurable options; empty for simple products.
    #[must_use]
    pub fn configurable_options(&self) -> &[NativeConfigurableOption] {
        self.extension_attributes
            .as_ref()
            .map(|ext| ext.configurable_product_options.as_slice())
            .unwrap_or_default()
    }
}

/// Extension attributes of a product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeProductExtension {
    #[serde(default)]
    pub configurable_product_options: Vec<NativeConfigurableOption>,
    #[serde(default)]
    pub configurable_product_links: Vec<u64>,
    #[serde(default)]
    pub stock_item: Option<NativeStockItem>,
}

/// Configurable option declared by a parent product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeConfigurableOption {
    #[serde(default, deserialize_with = "opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub attribute_id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub values: Vec<NativeOptionValue>,
}

/// Allowed value of a configurable option.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeOptionValue {
    #[serde(default, deserialize_with = "opt_id")]
    pub value_index: Option<String>,
}

/// Entry of a product's `custom_attributes` list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NativeAttribute {
    pub attribute_code: String,
    #[serde(default)]
    pub value: Value,
}

impl NativeAttribute {
    /// Creates an attribute with a text value.
    #[must_use]
    pub fn new(code: impl Into<String>, value: impl Into<String>) -> Self {
        Self { attribute_code: code.into(), value: Value::String(value.into()) }
    }

    /// Value as text; arrays are comma-joined, null is absent.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match &self.value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Array(values) => Some(
                values
                    .iter()
                    .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_owned))
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            other => Some(other.to_string()),
        }
    }
}

/// Product attribute metadata (`/products/attributes/{id}`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NativeAttributeMetadata {
    #[serde(default, deserialize_with = "opt_id")]
    pub attribute_id: Option<String>,
    #[serde(default)]
    pub attribute_code: Option<String>,
    #[serde(default)]
    pub default_frontend_label: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_configurable_options() {
        let product: NativeProduct = serde_json::from_value(json!({
            "id": 1,
            "sku": "MH01",
            "type_id": "configurable",
            "extension_attributes": {
                "configurable_product_options": [
                    {"id": 3, "attribute_id": "93", "label": "Color", "position": 0,
                     "values": [{"value_index": 49}, {"value_index": 50}]}
                ],
                "configurable_product_links": [11, 12]
            }
        }))
        .unwrap();

        let options = product.configurable_options();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].attribute_id.as_deref(), Some("93"));
        assert_eq!(options[0].values[1].value_index.as_deref(), Some("50"));
    }

    #[test]
    fn test_attribute_text() {
        let product: NativeProduct = serde_json::from_value(json!({
            "custom_attributes": [
                {"attribute_code": "color", "value": "49"},
                {"attribute_code": "category_ids", "value": ["3", "4"]},
                {"attribute_code": "size", "value": 168},
                {"attribute_code": "empty", "value": null}
            ]
        }))
        .unwrap();

        assert_eq!(product.attribute("color").as_deref(), Some("49"));
        assert_eq!(product.attribute("category_ids").as_deref(), Some("3,4"));
        assert_eq!(product.attribute("size").as_deref(), Some("168"));
        assert!(product.attribute("empty").is_none());
        assert!(product.attribute("missing").is_none());
    }

    #[test]
    fn test_simple_product_has_no_options() {
        assert!(NativeProduct::default().configurable_options().is_empty());
    }
}
