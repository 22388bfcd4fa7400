//! Fulfillment translation.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use super::common::{native_id, non_blank, parse_timestamp, push_field, quantity, to_payload};
use crate::{
    config::FieldNamespace,
    error::{BridgeError, Result},
    models::{FulfillOrderParams, Fulfillment, FulfillmentLineItem, TrackingInfo},
    native::NativeShipment,
};

/// Carrier code used when the caller names none.
pub const CUSTOM_CARRIER: &str = "custom";

/// Translates a native shipment.
#[must_use]
pub fn to_canonical(native: &NativeShipment, ns: &FieldNamespace) -> Fulfillment {
    let tracking_info: Vec<TrackingInfo> = native
        .tracks
        .iter()
        .filter_map(|track| {
            non_blank(track.track_number.as_deref()).map(|number| TrackingInfo {
                number,
                carrier: non_blank(track.carrier_code.as_deref()),
                title: non_blank(track.title.as_deref()),
            })
        })
        .collect();

    let mut custom_fields = Vec::new();
    push_field(&mut custom_fields, ns, "store_id", native.store_id.as_deref());

    Fulfillment {
        id: native.entity_id.clone().unwrap_or_default(),
        external_id: native.increment_id.clone(),
        order_id: native.order_id.clone().unwrap_or_default(),
        line_items: native
            .items
            .iter()
            .map(|item| FulfillmentLineItem {
                line_item_id: item.order_item_id.clone().unwrap_or_default(),
                sku: item.sku.clone(),
                name: item.name.clone(),
                quantity: quantity(item.qty),
            })
            .collect(),
        tracking_numbers: tracking_info.iter().map(|t| t.number.clone()).collect(),
        tracking_info,
        created_at: parse_timestamp(native.created_at.as_deref()),
        updated_at: parse_timestamp(native.updated_at.as_deref()),
        custom_fields,
        tags: BTreeSet::new(),
    }
}

#[derive(Debug, Serialize)]
struct ShipRequest {
    items: Vec<ShipItem>,
    notify: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tracks: Vec<ShipTrack>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<ShipComment>,
}

#[derive(Debug, Serialize)]
struct ShipItem {
    order_item_id: Value,
    qty: u32,
}

#[derive(Debug, Serialize)]
struct ShipTrack {
    track_number: String,
    carrier_code: String,
    title: String,
}

#[derive(Debug, Serialize)]
struct ShipComment {
    comment: String,
    is_visible_on_front: u8,
}

/// Builds the `POST /order/{id}/ship` body.
///
/// An empty line list ships everything still open on the order.
///
/// # Errors
///
/// Returns [`BridgeError::Validation`] when a line has zero quantity.
pub fn request_to_native(params: &FulfillOrderParams) -> Result<Value> {
    if let Some(line) = params.line_items.iter().find(|line| line.quantity == 0) {
        return Err(BridgeError::Validation(format!(
            "line item {} has zero quantity",
            line.line_item_id
        )));
    }

    let carrier = non_blank(params.shipping_carrier.as_deref()).unwrap_or_else(|| CUSTOM_CARRIER.to_owned());
    let title = non_blank(params.shipping_method.as_deref()).unwrap_or_else(|| carrier.clone());

    let request = ShipRequest {
        items: params
            .line_items
            .iter()
            .map(|line| ShipItem { order_item_id: native_id(&line.line_item_id), qty: line.quantity })
            .collect(),
        notify: params.notify_customer,
        tracks: params
            .tracking_numbers
            .iter()
            .filter_map(|number| non_blank(Some(number.as_str())))
            .map(|track_number| ShipTrack {
                track_number,
                carrier_code: carrier.clone(),
                title: title.clone(),
            })
            .collect(),
        comment: non_blank(params.notes.as_deref())
            .map(|comment| ShipComment { comment, is_visible_on_front: 0 }),
    };

    to_payload(&request)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::FulfillLineItem;

    #[test]
    fn test_shipment_to_canonical() {
        let native: NativeShipment = serde_json::from_value(json!({
            "entity_id": 3,
            "increment_id": "000000003",
            "order_id": 12,
            "store_id": 1,
            "created_at": "2024-05-02 09:00:00",
            "items": [{"order_item_id": 2, "sku": "MH01-XS-Black", "qty": 1}],
            "tracks": [
                {"track_number": "1Z999", "carrier_code": "ups", "title": "UPS Ground"},
                {"track_number": "", "carrier_code": "ups"}
            ]
        }))
        .unwrap();

        let fulfillment = to_canonical(&native, &FieldNamespace::default());
        assert_eq!(fulfillment.id, "3");
        assert_eq!(fulfillment.order_id, "12");
        assert_eq!(fulfillment.line_items[0].line_item_id, "2");
        assert_eq!(fulfillment.tracking_numbers, ["1Z999"]);
        assert_eq!(fulfillment.tracking_info[0].carrier.as_deref(), Some("ups"));
    }

    #[test]
    fn test_request_to_native() {
        let params = FulfillOrderParams {
            order_id: "12".to_owned(),
            line_items: vec![FulfillLineItem { line_item_id: "2".to_owned(), quantity: 1 }],
            tracking_numbers: vec!["1Z999".to_owned()],
            shipping_carrier: Some("ups".to_owned()),
            shipping_method: None,
            notes: Some("Left at door".to_owned()),
            notify_customer: true,
        };

        let body = request_to_native(&params).unwrap();
        assert_eq!(body["items"][0]["order_item_id"], 2);
        assert_eq!(body["items"][0]["qty"], 1);
        assert_eq!(body["notify"], true);
        assert_eq!(body["tracks"][0]["carrier_code"], "ups");
        assert_eq!(body["tracks"][0]["title"], "ups");
        assert_eq!(body["comment"]["comment"], "Left at door");
    }

    #[test]
    fn test_request_without_tracking_uses_no_tracks() {
        let params = FulfillOrderParams {
            order_id: "12".to_owned(),
            line_items: vec![],
            tracking_numbers: vec![],
            shipping_carrier: None,
            shipping_method: None,
            notes: None,
            notify_customer: false,
        };

        let body = request_to_native(&params).unwrap();
        assert!(body.get("tracks").is_none());
        assert!(body.get("comment").is_none());
        assert_eq!(body["items"], json!([]));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let params = FulfillOrderParams {
            order_id: "12".to_owned(),
            line_items: vec![FulfillLineItem { line_item_id: "2".to_owned(), quantity: 0 }],
            tracking_numbers: vec![],
            shipping_carrier: None,
            shipping_method: None,
            notes: None,
            notify_customer: false,
        };
        assert!(matches!(request_to_native(&params), Err(BridgeError::Validation(_))));
    }
}
