//! Customer translation.

use std::collections::BTreeSet;

use super::common::{address_from_parts, non_blank, parse_timestamp, push_field};
use crate::{
    config::FieldNamespace,
    models::{Address, Customer},
    native::{NativeCustomer, NativeCustomerAddress},
};

/// Translates a native customer account.
#[must_use]
pub fn to_canonical(native: &NativeCustomer, ns: &FieldNamespace) -> Customer {
    let mut custom_fields = Vec::new();
    push_field(&mut custom_fields, ns, "group_id", native.group_id.as_deref());
    push_field(&mut custom_fields, ns, "store_id", native.store_id.as_deref());
    push_field(&mut custom_fields, ns, "website_id", native.website_id.as_deref());

    Customer {
        id: native.id.clone().unwrap_or_default(),
        external_id: None,
        email: non_blank(native.email.as_deref()),
        first_name: non_blank(native.firstname.as_deref()),
        last_name: non_blank(native.lastname.as_deref()),
        phone: native
            .default_billing_address()
            .and_then(|address| non_blank(address.telephone.as_deref())),
        addresses: native.addresses.iter().filter_map(address_to_canonical).collect(),
        created_at: parse_timestamp(native.created_at.as_deref()),
        updated_at: parse_timestamp(native.updated_at.as_deref()),
        custom_fields,
        tags: BTreeSet::new(),
    }
}

fn address_to_canonical(native: &NativeCustomerAddress) -> Option<Address> {
    let region = native.region.as_ref();
    address_from_parts(
        native.firstname.as_deref(),
        native.lastname.as_deref(),
        native.company.as_deref(),
        &native.street,
        native.city.as_deref(),
        region.and_then(|r| r.region.as_deref()),
        region.and_then(|r| r.region_code.as_deref()),
        native.postcode.as_deref(),
        native.country_id.as_deref(),
        native.telephone.as_deref(),
    )
}
