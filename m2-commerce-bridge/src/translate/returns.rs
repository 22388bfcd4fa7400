//! Return translation for both native sources.
//!
//! RMAs translate into [`ReturnDetails::Inspection`], credit memos into
//! [`ReturnDetails::Financial`]. Either way the return carries a
//! `{namespace}_return_origin` custom field as its first entry.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};

use super::common::{magnitude, native_id, non_blank, parse_timestamp, push_field, quantity, to_payload};
use crate::{
    config::FieldNamespace,
    error::{BridgeError, Result},
    models::{
        CustomField, FinancialDetails, InspectionDetails, Return, ReturnDetails, ReturnDraft,
        ReturnLineItem, ReturnOrigin,
    },
    native::{NativeCreditMemo, NativeRma},
};

/// Outcome of every credit memo.
pub const OUTCOME_REFUND: &str = "refund";

/// Outcome of an RMA whose lines ask for different resolutions.
pub const OUTCOME_MIXED: &str = "mixed";

const RMA_PENDING: &str = "pending";

/// Credit memo states as canonical statuses.
const CREDIT_MEMO_STATES: [(u8, &str); 3] = [(1, "open"), (2, "refunded"), (3, "canceled")];

/// Native credit memo state code of a canonical status.
#[must_use]
pub fn credit_memo_state(status: &str) -> Option<u8> {
    let status = status.trim().to_ascii_lowercase();
    let status = if status == "cancelled" { "canceled" } else { status.as_str() };
    CREDIT_MEMO_STATES.iter().find(|(_, name)| *name == status).map(|(code, _)| *code)
}

/// Canonical status of a native credit memo state code.
#[must_use]
pub fn credit_memo_status(state: u8) -> Option<&'static str> {
    CREDIT_MEMO_STATES.iter().find(|(code, _)| *code == state).map(|(_, name)| *name)
}

fn origin_field(ns: &FieldNamespace, origin: ReturnOrigin) -> CustomField {
    ns.field("return_origin", origin.as_str())
}

/// Translates a return authorization.
#[must_use]
pub fn rma_to_canonical(native: &NativeRma, ns: &FieldNamespace) -> Return {
    let line_items: Vec<ReturnLineItem> = native
        .items
        .iter()
        .map(|item| ReturnLineItem {
            id: item.entity_id.clone().unwrap_or_default(),
            line_item_id: item.order_item_id.clone(),
            sku: item.product_sku.clone(),
            name: item.product_name.clone(),
            quantity: quantity(item.qty_requested),
            quantity_authorized: item.qty_authorized.map(|q| quantity(Some(q))),
            quantity_received: item.qty_returned.map(|q| quantity(Some(q))),
            quantity_approved: item.qty_approved.map(|q| quantity(Some(q))),
            reason: item.reason.clone(),
            condition: item.condition.clone(),
            resolution: item.resolution.clone(),
            status: item.status.clone(),
        })
        .collect();

    let mut custom_fields = vec![origin_field(ns, ReturnOrigin::Rma)];
    push_field(&mut custom_fields, ns, "store_id", native.store_id.as_deref());
    push_field(&mut custom_fields, ns, "order_increment_id", native.order_increment_id.as_deref());

    Return {
        id: native.entity_id.clone().unwrap_or_default(),
        external_id: native.increment_id.clone(),
        order_id: native.order_id.clone(),
        status: non_blank(native.status.as_deref()),
        outcome: rma_outcome(&line_items),
        details: ReturnDetails::Inspection(InspectionDetails {
            line_items,
            customer_email: non_blank(native.customer_custom_email.as_deref()),
        }),
        created_at: parse_timestamp(native.date_requested.as_deref()),
        updated_at: None,
        custom_fields,
        tags: BTreeSet::new(),
    }
}

/// Common resolution of all lines, `mixed` when they disagree.
fn rma_outcome(lines: &[ReturnLineItem]) -> Option<String> {
    let mut resolutions = lines.iter().filter_map(|line| line.resolution.as_deref());
    let first = resolutions.next()?;
    if resolutions.all(|resolution| resolution == first) {
        Some(first.to_owned())
    } else {
        Some(OUTCOME_MIXED.to_owned())
    }
}

/// Translates a credit memo.
///
/// Credit memos carry aggregate money only; the line detail subset stays absent.
#[must_use]
pub fn credit_memo_to_canonical(
    native: &NativeCreditMemo,
    ns: &FieldNamespace,
    default_currency: &str,
) -> Return {
    let mut custom_fields = vec![origin_field(ns, ReturnOrigin::CreditMemo)];
    push_field(&mut custom_fields, ns, "store_id", native.store_id.as_deref());
    if let Some(state) = native.state {
        custom_fields.push(ns.field("state", state.to_string()));
    }

    Return {
        id: native.entity_id.clone().unwrap_or_default(),
        external_id: native.increment_id.clone(),
        order_id: native.order_id.clone(),
        status: native.state.and_then(credit_memo_status).map(str::to_owned),
        outcome: Some(OUTCOME_REFUND.to_owned()),
        details: ReturnDetails::Financial(FinancialDetails {
            currency: non_blank(native.order_currency_code.as_deref())
                .unwrap_or_else(|| default_currency.to_owned()),
            total_refunded: native.grand_total,
            subtotal: native.subtotal,
            shipping_refunded: native.shipping_amount,
            tax_refunded: native.tax_amount,
            adjustment_refund: native.adjustment_positive,
            adjustment_fee: magnitude(native.adjustment_negative),
        }),
        created_at: parse_timestamp(native.created_at.as_deref()),
        updated_at: parse_timestamp(native.updated_at.as_deref()),
        custom_fields,
        tags: BTreeSet::new(),
    }
}

fn validate_draft(draft: &ReturnDraft) -> Result<()> {
    if draft.line_items.is_empty() {
        return Err(BridgeError::Validation("return needs at least one line item".to_owned()));
    }
    if let Some(line) = draft.line_items.iter().find(|line| line.quantity == 0) {
        return Err(BridgeError::Validation(format!(
            "line item {} has zero quantity",
            line.line_item_id
        )));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct RmaEntity {
    order_id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_custom_email: Option<String>,
    status: &'static str,
    items: Vec<RmaItemEntity>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    comments: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct RmaItemEntity {
    order_item_id: Value,
    qty_requested: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<String>,
    status: &'static str,
}

/// Builds the `POST /returns` body.
///
/// # Errors
///
/// Returns [`BridgeError::Validation`] when the draft has no lines or a zero quantity.
pub fn draft_to_rma(draft: &ReturnDraft) -> Result<Value> {
    validate_draft(draft)?;

    let entity = RmaEntity {
        order_id: native_id(&draft.order_id),
        customer_custom_email: non_blank(draft.customer_email.as_deref()),
        status: RMA_PENDING,
        items: draft
            .line_items
            .iter()
            .map(|line| RmaItemEntity {
                order_item_id: native_id(&line.line_item_id),
                qty_requested: line.quantity,
                reason: line.reason.clone(),
                condition: line.condition.clone(),
                resolution: line.resolution.clone(),
                status: RMA_PENDING,
            })
            .collect(),
        comments: non_blank(draft.notes.as_deref())
            .map(|comment| {
                json!({
                    "comment": comment,
                    "is_customer_notified": u8::from(draft.notify_customer),
                    "is_visible_on_front": 1,
                })
            })
            .into_iter()
            .collect(),
    };

    Ok(json!({ "rmaDataObject": to_payload(&entity)? }))
}

#[derive(Debug, Serialize)]
struct RefundRequest {
    items: Vec<RefundItem>,
    notify: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    arguments: Option<RefundArguments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<Value>,
}

#[derive(Debug, Serialize)]
struct RefundItem {
    order_item_id: Value,
    qty: u32,
}

#[derive(Debug, Serialize)]
struct RefundArguments {
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adjustment_positive: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adjustment_negative: Option<Decimal>,
}

/// Builds the `POST /order/{id}/refund` body.
///
/// # Errors
///
/// Returns [`BridgeError::Validation`] when the draft has no lines or a zero quantity.
pub fn draft_to_refund(draft: &ReturnDraft) -> Result<Value> {
    validate_draft(draft)?;

    let arguments = (draft.refund_shipping.is_some()
        || draft.adjustment_refund.is_some()
        || draft.adjustment_fee.is_some())
    .then(|| RefundArguments {
        shipping_amount: draft.refund_shipping,
        adjustment_positive: draft.adjustment_refund,
        adjustment_negative: magnitude(draft.adjustment_fee),
    });

    let request = RefundRequest {
        items: draft
            .line_items
            .iter()
            .map(|line| RefundItem { order_item_id: native_id(&line.line_item_id), qty: line.quantity })
            .collect(),
        notify: draft.notify_customer,
        arguments,
        comment: non_blank(draft.notes.as_deref())
            .map(|comment| json!({ "comment": comment, "is_visible_on_front": 0 })),
    };

    to_payload(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReturnLineItemDraft;

    fn rma() -> NativeRma {
        serde_json::from_value(json!({
            "entity_id": 4,
            "increment_id": "000000004",
            "order_id": 12,
            "order_increment_id": "000000012",
            "store_id": 1,
            "customer_custom_email": "ada@example.com",
            "status": "authorized",
            "date_requested": "2024-05-10 12:00:00",
            "items": [
                {"entity_id": 9, "order_item_id": 2, "product_sku": "MH01-XS-Black",
                 "qty_requested": 1, "qty_authorized": 1, "reason": 7, "condition": 9,
                 "resolution": 4, "status": "authorized"}
            ]
        }))
        .unwrap()
    }

    fn credit_memo() -> NativeCreditMemo {
        serde_json::from_value(json!({
            "entity_id": 6,
            "increment_id": "000000006",
            "order_id": 12,
            "state": 2,
            "order_currency_code": "USD",
            "subtotal": 45,
            "shipping_amount": 5,
            "adjustment_negative": 2,
            "grand_total": 48,
            "created_at": "2024-05-11 08:00:00",
            "items": [{"order_item_id": 2, "qty": 1}]
        }))
        .unwrap()
    }

    fn draft() -> ReturnDraft {
        ReturnDraft {
            order_id: "12".to_owned(),
            line_items: vec![ReturnLineItemDraft {
                line_item_id: "2".to_owned(),
                quantity: 1,
                reason: Some("7".to_owned()),
                condition: None,
                resolution: Some("4".to_owned()),
            }],
            customer_email: None,
            notes: Some("Wrong size".to_owned()),
            refund_shipping: Some(Decimal::new(5, 0)),
            adjustment_refund: None,
            adjustment_fee: Some(Decimal::new(-2, 0)),
            notify_customer: true,
        }
    }

    #[test]
    fn test_rma_to_canonical() {
        let ret = rma_to_canonical(&rma(), &FieldNamespace::default());
        assert_eq!(ret.origin(), ReturnOrigin::Rma);
        assert_eq!(ret.custom_fields[0].name, "m2_return_origin");
        assert_eq!(ret.custom_fields[0].value, "rma");
        assert_eq!(ret.outcome.as_deref(), Some("4"));
        assert_eq!(ret.status.as_deref(), Some("authorized"));

        let json = serde_json::to_value(&ret).unwrap();
        assert_eq!(json["lineItems"][0]["quantityAuthorized"], 1);
        assert_eq!(json["customerEmail"], "ada@example.com");
        assert!(json.get("totalRefunded").is_none());
        assert!(json.get("currency").is_none());
    }

    #[test]
    fn test_credit_memo_to_canonical() {
        let ret = credit_memo_to_canonical(&credit_memo(), &FieldNamespace::default(), "EUR");
        assert_eq!(ret.origin(), ReturnOrigin::CreditMemo);
        assert_eq!(ret.custom_fields[0].value, "credit_memo");
        assert_eq!(ret.status.as_deref(), Some("refunded"));
        assert_eq!(ret.outcome.as_deref(), Some("refund"));

        let json = serde_json::to_value(&ret).unwrap();
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["totalRefunded"], "48");
        assert_eq!(json["adjustmentFee"], "2");
        assert!(json.get("lineItems").is_none());
        assert!(json.get("customerEmail").is_none());
        assert!(json.get("adjustmentRefund").is_none());
    }

    #[test]
    fn test_credit_memo_without_total_omits_it() {
        let mut native = credit_memo();
        native.grand_total = None;

        let json = serde_json::to_value(credit_memo_to_canonical(&native, &FieldNamespace::default(), "EUR"))
            .unwrap();
        assert!(json.get("totalRefunded").is_none());
        assert_eq!(json["subtotal"], "45");
    }

    #[test]
    fn test_rma_outcome_mixed() {
        let mut native = rma();
        let mut second = native.items[0].clone();
        second.resolution = Some("5".to_owned());
        native.items.push(second);

        let ret = rma_to_canonical(&native, &FieldNamespace::default());
        assert_eq!(ret.outcome.as_deref(), Some(OUTCOME_MIXED));
    }

    #[test]
    fn test_rma_outcome_absent_without_resolutions() {
        let mut native = rma();
        native.items[0].resolution = None;
        assert!(rma_to_canonical(&native, &FieldNamespace::default()).outcome.is_none());
    }

    #[test]
    fn test_credit_memo_state_mapping() {
        assert_eq!(credit_memo_state("open"), Some(1));
        assert_eq!(credit_memo_state("Refunded"), Some(2));
        assert_eq!(credit_memo_state("cancelled"), Some(3));
        assert_eq!(credit_memo_state("authorized"), None);
        assert_eq!(credit_memo_status(3), Some("canceled"));
        assert_eq!(credit_memo_status(9), None);
    }

    #[test]
    fn test_draft_to_rma() {
        let body = draft_to_rma(&draft()).unwrap();
        let entity = &body["rmaDataObject"];
        assert_eq!(entity["order_id"], 12);
        assert_eq!(entity["status"], "pending");
        assert_eq!(entity["items"][0]["order_item_id"], 2);
        assert_eq!(entity["items"][0]["qty_requested"], 1);
        assert_eq!(entity["comments"][0]["is_customer_notified"], 1);
    }

    #[test]
    fn test_draft_to_refund() {
        let body = draft_to_refund(&draft()).unwrap();
        assert_eq!(body["items"][0]["qty"], 1);
        assert_eq!(body["notify"], true);
        assert_eq!(body["arguments"]["shipping_amount"], "5");
        assert_eq!(body["arguments"]["adjustment_negative"], "2");
        assert!(body["arguments"].get("adjustment_positive").is_none());
        assert_eq!(body["comment"]["comment"], "Wrong size");
    }

    #[test]
    fn test_empty_draft_rejected() {
        let mut empty = draft();
        empty.line_items.clear();
        assert!(matches!(draft_to_rma(&empty), Err(BridgeError::Validation(_))));
        assert!(matches!(draft_to_refund(&empty), Err(BridgeError::Validation(_))));
    }
}
