//! Product and variant translation.

use std::collections::BTreeSet;

use super::{
    common::{non_blank, parse_timestamp, push_field},
    options::ParentOption,
};
use crate::{
    config::FieldNamespace,
    models::{CustomField, Money, Product, ProductOption, SelectedOption, Variant},
    native::NativeProduct,
};

/// Name of the option synthesized for products without configurable options.
pub const DEFAULT_OPTION_NAME: &str = "Default";

/// Translates a native product.
///
/// The native record carries no currency, so the caller supplies it. Products without
/// configurable options get a single `Default` option with no values.
#[must_use]
pub fn to_canonical(native: &NativeProduct, ns: &FieldNamespace, currency: &str) -> Product {
    let mut options: Vec<ProductOption> = native
        .configurable_options()
        .iter()
        .map(|option| ParentOption::from_native(option).to_product_option())
        .collect();
    if options.is_empty() {
        options.push(ProductOption { name: DEFAULT_OPTION_NAME.to_owned(), values: Vec::new() });
    }

    Product {
        id: native.id.clone().unwrap_or_default(),
        external_id: native.sku.clone(),
        title: non_blank(native.name.as_deref()),
        description: native.attribute("description"),
        handle: native.attribute("url_key"),
        status: native.status.and_then(status_name).map(str::to_owned),
        price: native.price.map(|amount| Money { amount, currency_code: currency.to_owned() }),
        options,
        created_at: parse_timestamp(native.created_at.as_deref()),
        updated_at: parse_timestamp(native.updated_at.as_deref()),
        custom_fields: catalog_fields(native, ns),
        tags: BTreeSet::new(),
    }
}

/// Caller-supplied context of a variant translation.
#[derive(Debug, Clone, Copy)]
pub struct VariantContext<'a> {
    /// Currency of the variant price.
    pub currency: &'a str,
    /// Parent product id, when the parent is known.
    pub parent_id: Option<&'a str>,
    /// Pre-resolved selected options.
    pub selected_options: &'a [SelectedOption],
}

impl<'a> VariantContext<'a> {
    /// Context for a variant whose parent is unknown.
    #[must_use]
    pub const fn orphan(currency: &'a str) -> Self {
        Self { currency, parent_id: None, selected_options: &[] }
    }
}

/// Translates a native simple product into a variant.
///
/// With a known parent the variant links by `product_id`; otherwise it carries its own
/// SKU as `external_product_id`.
#[must_use]
pub fn variant_to_canonical(
    native: &NativeProduct,
    ns: &FieldNamespace,
    ctx: VariantContext<'_>,
) -> Variant {
    let (product_id, external_product_id) = match ctx.parent_id {
        Some(parent) => (Some(parent.to_owned()), None),
        None => (None, native.sku.clone()),
    };

    Variant {
        id: native.id.clone().unwrap_or_default(),
        product_id,
        external_product_id,
        sku: native.sku.clone(),
        title: non_blank(native.name.as_deref()),
        price: native.price.map(|amount| Money { amount, currency_code: ctx.currency.to_owned() }),
        weight: native.weight,
        inventory_quantity: native
            .extension_attributes
            .as_ref()
            .and_then(|ext| ext.stock_item.as_ref())
            .and_then(|stock| stock.qty),
        selected_options: ctx.selected_options.to_vec(),
        created_at: parse_timestamp(native.created_at.as_deref()),
        updated_at: parse_timestamp(native.updated_at.as_deref()),
        custom_fields: catalog_fields(native, ns),
        tags: BTreeSet::new(),
    }
}

fn catalog_fields(native: &NativeProduct, ns: &FieldNamespace) -> Vec<CustomField> {
    let mut fields = Vec::new();
    push_field(&mut fields, ns, "type_id", native.type_id.as_deref());
    push_field(&mut fields, ns, "attribute_set_id", native.attribute_set_id.as_deref());
    if let Some(visibility) = native.visibility {
        fields.push(ns.field("visibility", visibility.to_string()));
    }
    fields
}

const fn status_name(status: u8) -> Option<&'static str> {
    match status {
        1 => Some("active"),
        2 => Some("inactive"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    fn native(value: serde_json::Value) -> NativeProduct {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_simple_product_gets_default_option() {
        let product = to_canonical(
            &native(json!({"id": 5, "sku": "MB01", "name": "Bag", "price": 34, "status": 1})),
            &FieldNamespace::default(),
            "USD",
        );

        assert_eq!(product.options, [ProductOption { name: "Default".to_owned(), values: vec![] }]);
        assert_eq!(product.status.as_deref(), Some("active"));
        assert_eq!(product.price.unwrap().currency_code, "USD");
        assert_eq!(product.external_id.as_deref(), Some("MB01"));
    }

    #[test]
    fn test_configurable_product_options() {
        let product = to_canonical(
            &native(json!({
                "id": 1,
                "sku": "MH01",
                "type_id": "configurable",
                "custom_attributes": [
                    {"attribute_code": "url_key", "value": "chaz-hoodie"},
                    {"attribute_code": "description", "value": "<p>Warm</p>"}
                ],
                "extension_attributes": {"configurable_product_options": [
                    {"attribute_id": "144", "label": "Size", "values": [{"value_index": 167}, {"value_index": 168}]},
                    {"attribute_id": "93", "label": "Color", "values": [{"value_index": 49}]}
                ]}
            })),
            &FieldNamespace::default(),
            "EUR",
        );

        assert_eq!(product.options.len(), 2);
        assert_eq!(product.options[0].name, "Size");
        assert_eq!(product.options[0].values, ["167", "168"]);
        assert_eq!(product.handle.as_deref(), Some("chaz-hoodie"));
        assert_eq!(product.description.as_deref(), Some("<p>Warm</p>"));
        assert!(product.price.is_none());
        assert_eq!(product.custom_fields[0].name, "m2_type_id");
    }

    #[test]
    fn test_variant_with_parent() {
        let selected = [SelectedOption { name: "Color".to_owned(), value: "49".to_owned() }];
        let variant = variant_to_canonical(
            &native(json!({
                "id": 11,
                "sku": "MH01-XS-Black",
                "price": 52,
                "extension_attributes": {"stock_item": {"qty": 100, "is_in_stock": true}}
            })),
            &FieldNamespace::default(),
            VariantContext { currency: "USD", parent_id: Some("1"), selected_options: &selected },
        );

        assert_eq!(variant.product_id.as_deref(), Some("1"));
        assert!(variant.external_product_id.is_none());
        assert_eq!(variant.selected_options, selected);
        assert_eq!(variant.inventory_quantity, Some(Decimal::new(100, 0)));
        assert_eq!(variant.price.unwrap().amount, Decimal::new(52, 0));
    }

    #[test]
    fn test_variant_without_parent_uses_sku() {
        let variant = variant_to_canonical(
            &native(json!({"id": 11, "sku": "MH01-XS-Black"})),
            &FieldNamespace::default(),
            VariantContext::orphan("USD"),
        );

        assert!(variant.product_id.is_none());
        assert_eq!(variant.external_product_id.as_deref(), Some("MH01-XS-Black"));
        assert!(variant.selected_options.is_empty());

        let json = serde_json::to_value(&variant).unwrap();
        assert!(json.get("productId").is_none());
        assert_eq!(json["externalProductId"], "MH01-XS-Black");
    }
}
