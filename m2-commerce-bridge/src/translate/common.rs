//! Helpers shared by the entity translators.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::FieldNamespace,
    criteria::NATIVE_DATETIME_FORMAT,
    error::{BridgeError, Result},
    models::{Address, CustomField},
    native::NativeAddress,
};

/// Parses a native timestamp (`YYYY-MM-DD HH:MM:SS`, UTC) or an RFC 3339 one.
///
/// Unparseable values are dropped so the canonical field is omitted.
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, NATIVE_DATETIME_FORMAT) {
        return Some(naive.and_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    debug!(timestamp = raw, "dropping unparseable timestamp");
    None
}

/// Absolute value of an adjustment; the platform stores discounts negative.
pub fn magnitude(amount: Option<Decimal>) -> Option<Decimal> {
    amount.map(|a| a.abs())
}

/// Converts a native decimal quantity to a whole count, clamping negatives to zero.
pub fn quantity(qty: Option<Decimal>) -> u32 {
    qty.and_then(|q| q.trunc().to_u32()).unwrap_or(0)
}

/// `Some` only for non-blank text.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

/// Pushes a custom field when the native value is present.
pub fn push_field(
    fields: &mut Vec<CustomField>,
    ns: &FieldNamespace,
    key: &str,
    value: Option<&str>,
) {
    if let Some(value) = non_blank(value) {
        fields.push(ns.field(key, value));
    }
}

/// Synthesizes a canonical address, or `None` when no native field is set.
#[allow(clippy::too_many_arguments, reason = "mirrors the flat native address columns")]
pub fn address_from_parts(
    firstname: Option<&str>,
    lastname: Option<&str>,
    company: Option<&str>,
    street: &[String],
    city: Option<&str>,
    region: Option<&str>,
    region_code: Option<&str>,
    postcode: Option<&str>,
    country_id: Option<&str>,
    telephone: Option<&str>,
) -> Option<Address> {
    let mut lines = street.iter().map(String::as_str).filter(|l| !l.trim().is_empty());
    let address1 = lines.next().map(str::to_owned);
    let rest: Vec<&str> = lines.collect();
    let address2 = if rest.is_empty() { None } else { Some(rest.join(", ")) };

    let address = Address {
        first_name: non_blank(firstname),
        last_name: non_blank(lastname),
        company: non_blank(company),
        address1,
        address2,
        city: non_blank(city),
        province: non_blank(region),
        province_code: non_blank(region_code),
        postal_code: non_blank(postcode),
        country_code: non_blank(country_id),
        phone: non_blank(telephone),
    };

    if address == Address::default() { None } else { Some(address) }
}

/// Canonical address of a native order address.
pub fn order_address_to_canonical(native: &NativeAddress) -> Option<Address> {
    address_from_parts(
        native.firstname.as_deref(),
        native.lastname.as_deref(),
        native.company.as_deref(),
        &native.street,
        native.city.as_deref(),
        native.region.as_deref(),
        native.region_code.as_deref(),
        native.postcode.as_deref(),
        native.country_id.as_deref(),
        native.telephone.as_deref(),
    )
}

/// Native write shape of a canonical address.
pub fn address_to_native(address: &Address, address_type: &str) -> NativeAddress {
    let street = [&address.address1, &address.address2]
        .into_iter()
        .filter_map(|line| non_blank(line.as_deref()))
        .collect();

    NativeAddress {
        address_type: Some(address_type.to_owned()),
        firstname: address.first_name.clone(),
        lastname: address.last_name.clone(),
        company: address.company.clone(),
        street,
        city: address.city.clone(),
        region: address.province.clone(),
        region_code: address.province_code.clone(),
        postcode: address.postal_code.clone(),
        country_id: address.country_code.clone(),
        telephone: address.phone.clone(),
        ..NativeAddress::default()
    }
}

/// Native id value: numeric ids go out as numbers, anything else as text.
pub fn native_id(id: &str) -> Value {
    id.parse::<u64>().map_or_else(|_| Value::String(id.to_owned()), Value::from)
}

/// Serializes a typed write payload.
pub fn to_payload<T: Serialize>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload)
        .map_err(|e| BridgeError::InvalidInput(format!("cannot encode request payload: {e}")))
}

/// Decodes a native response into its typed record.
pub fn from_response<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| BridgeError::Response(format!("malformed {what} payload: {e}")))
}

/// Id returned by a create endpoint, sent either as a number or as a string.
pub fn id_from_response(value: &Value, what: &str) -> Result<String> {
    match value {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_owned()),
        other => Err(BridgeError::Response(format!("expected {what} id, got: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn test_parse_native_timestamp() {
        let parsed = parse_timestamp(Some("2024-03-05 14:07:09")).unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2024, 3, 5));
        assert_eq!((parsed.hour(), parsed.minute(), parsed.second()), (14, 7, 9));
    }

    #[test]
    fn test_parse_rfc3339_timestamp() {
        let parsed = parse_timestamp(Some("2024-03-05T14:07:09+02:00")).unwrap();
        assert_eq!(parsed.hour(), 12);
    }

    #[test]
    fn test_parse_timestamp_drops_garbage() {
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(Some("")).is_none());
        assert!(parse_timestamp(None).is_none());
    }

    #[test]
    fn test_magnitude_is_never_negative() {
        assert_eq!(magnitude(Some(Decimal::new(-125, 1))), Some(Decimal::new(125, 1)));
        assert_eq!(magnitude(Some(Decimal::new(30, 0))), Some(Decimal::new(30, 0)));
        assert_eq!(magnitude(None), None);
    }

    #[test]
    fn test_quantity() {
        assert_eq!(quantity(Some(Decimal::new(20000, 4))), 2);
        assert_eq!(quantity(Some(Decimal::new(-1, 0))), 0);
        assert_eq!(quantity(None), 0);
    }

    #[test]
    fn test_address_omitted_when_empty() {
        assert!(order_address_to_canonical(&NativeAddress::default()).is_none());

        let blank = NativeAddress {
            street: vec![String::new()],
            city: Some("  ".to_owned()),
            ..NativeAddress::default()
        };
        assert!(order_address_to_canonical(&blank).is_none());
    }

    #[test]
    fn test_address_street_lines() {
        let native = NativeAddress {
            street: vec!["1 Main St".to_owned(), "Suite 4".to_owned(), "Floor 2".to_owned()],
            country_id: Some("US".to_owned()),
            ..NativeAddress::default()
        };
        let address = order_address_to_canonical(&native).unwrap();
        assert_eq!(address.address1.as_deref(), Some("1 Main St"));
        assert_eq!(address.address2.as_deref(), Some("Suite 4, Floor 2"));
        assert_eq!(address.country_code.as_deref(), Some("US"));
        assert!(address.city.is_none());
    }

    #[test]
    fn test_address_to_native() {
        let address = Address {
            first_name: Some("Ada".to_owned()),
            address1: Some("1 Main St".to_owned()),
            postal_code: Some("78701".to_owned()),
            ..Address::default()
        };
        let native = address_to_native(&address, "shipping");
        assert_eq!(native.address_type.as_deref(), Some("shipping"));
        assert_eq!(native.street, ["1 Main St"]);
        assert_eq!(native.postcode.as_deref(), Some("78701"));
    }

    #[test]
    fn test_id_from_response() {
        assert_eq!(id_from_response(&Value::from(17), "shipment").unwrap(), "17");
        assert_eq!(id_from_response(&Value::from(" 17 "), "shipment").unwrap(), "17");
        assert!(id_from_response(&Value::Null, "shipment").is_err());
    }

    #[test]
    fn test_native_id() {
        assert_eq!(native_id("42"), Value::from(42_u64));
        assert_eq!(native_id("ABC-1"), Value::String("ABC-1".to_owned()));
    }
}
