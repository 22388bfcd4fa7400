//! Integration tests for the canonical operations against a scripted transport.

#![allow(clippy::unwrap_used, reason = "test code")]

mod common;

use common::{MockTransport, Reply, bridge, filters};
use m2_commerce_bridge::{
    Operation,
    error::HttpMethod,
    models::{
        CancelOrderParams, FulfillOrderParams, GetInventoryParams, GetOrdersParams,
        GetProductVariantsParams, OrderDraft, UpdateOrderParams,
    },
};
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn native_order() -> Value {
    json!({
        "entity_id": 7,
        "increment_id": "000000007",
        "state": "new",
        "status": "pending",
        "store_id": 1,
        "customer_email": "jane@example.com",
        "customer_firstname": "Jane",
        "order_currency_code": "USD",
        "subtotal": 90,
        "discount_amount": -10,
        "grand_total": 85,
        "created_at": "2024-02-01 09:15:00",
        "items": [
            {"item_id": 70, "sku": "MB01", "name": "Tee", "product_type": "configurable",
             "qty_ordered": 1, "price": 45, "row_total": 45},
            {"item_id": 71, "parent_item_id": 70, "sku": "MB01-red", "name": "Tee",
             "product_type": "simple", "qty_ordered": 1, "price": 0},
            {"item_id": 72, "sku": "MB02", "name": "Mug", "product_type": "simple",
             "qty_ordered": 1, "price": 45, "row_total": 45}
        ],
        "billing_address": {
            "entity_id": 501, "address_type": "billing", "firstname": "Jane",
            "street": ["1 Main St"], "city": "Austin", "postcode": "78701",
            "country_id": "US", "email": "jane@example.com"
        },
        "extension_attributes": {
            "shipping_assignments": [{
                "shipping": {
                    "method": "flatrate_flatrate",
                    "address": {"entity_id": 502, "address_type": "shipping", "city": "Austin", "country_id": "US"}
                }
            }]
        }
    })
}

fn parent_product(id: u64, sku: &str) -> Value {
    json!({
        "items": [{
            "id": id,
            "sku": sku,
            "type_id": "configurable",
            "extension_attributes": {
                "configurable_product_options": [
                    {"id": 1, "attribute_id": "93", "label": "Color", "values": [{"value_index": 5}]},
                    {"id": 2, "attribute_id": "144", "label": "Shirt Size", "values": [{"value_index": 8}]}
                ]
            }
        }]
    })
}

#[tokio::test]
async fn test_get_orders_builds_criteria_and_translates() {
    let bridge = bridge(MockTransport::new().on_get("/orders", json!({"items": [native_order()], "total_count": 1})));
    let params: GetOrdersParams = serde_json::from_value(json!({
        "ids": ["7", "8"],
        "names": ["#000000007"],
        "statuses": ["pending"],
        "skip": 20,
        "pageSize": 10
    }))
    .unwrap();

    let orders = bridge.try_get_orders(&params).await.unwrap();

    let calls = bridge.transport().calls();
    let criteria = calls[0].criteria.as_ref().unwrap();
    assert_eq!(
        filters(criteria),
        [
            ("entity_id".to_owned(), "7,8".to_owned(), "in".to_owned()),
            ("increment_id".to_owned(), "000000007".to_owned(), "in".to_owned()),
            ("status".to_owned(), "pending".to_owned(), "in".to_owned()),
        ]
    );
    assert_eq!(criteria.current_page, 3);

    let order = &orders[0];
    assert_eq!(order.id, "7");
    assert_eq!(order.name.as_deref(), Some("#000000007"));
    assert_eq!(order.order_discount, Some(Decimal::from(10)));
    let lines = order.line_items.as_ref().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].sku.as_deref(), Some("MB01-red"));
    assert_eq!(lines[0].unit_price, Some(Decimal::from(45)));
    assert!(order.shipping_address.is_some());
}

#[tokio::test]
async fn test_get_orders_without_filters_omits_filter_groups() {
    let bridge = bridge(MockTransport::new().on_get("/orders", json!({"items": []})));

    bridge.try_get_orders(&GetOrdersParams::default()).await.unwrap();

    let criteria = bridge.transport().calls()[0].criteria.clone().unwrap();
    assert!(criteria.filter_groups.is_none());
    assert_eq!(criteria.page_size, 10);
    assert_eq!(criteria.current_page, 1);
}

#[tokio::test]
async fn test_create_order_posts_entity() {
    let bridge = bridge(MockTransport::new().on_post("/orders", native_order()));
    let draft: OrderDraft = serde_json::from_value(json!({
        "customer": {"email": "jane@example.com"},
        "lineItems": [{"sku": "MB02", "quantity": 2, "unitPrice": "45.00"}],
        "tags": ["vip"]
    }))
    .unwrap();

    let response = bridge.create_order(&draft).await;

    let payload = serde_json::to_value(&response).unwrap();
    assert_eq!(payload["success"], true);
    assert_eq!(payload["order"]["id"], "7");

    let body = bridge.transport().calls()[0].body.clone().unwrap();
    assert_eq!(body["entity"]["customer_email"], "jane@example.com");
    assert_eq!(body["entity"]["items"][0]["qty_ordered"], 2);
    assert_eq!(body["entity"]["order_currency_code"], "USD");
}

#[tokio::test]
async fn test_update_order_requires_changes() {
    let bridge = bridge(MockTransport::new());
    let params = UpdateOrderParams { id: "7".to_owned(), updates: Default::default() };

    let response = bridge.update_order(&params).await;

    assert!(response.error().unwrap().starts_with("Validation failed"));
    assert!(bridge.transport().calls().is_empty());
}

#[tokio::test]
async fn test_update_order_saves_address_and_comment() {
    let bridge = bridge(
        MockTransport::new()
            .on_get("/orders/7", native_order())
            .on(HttpMethod::Put, "/orders/7", Reply::Json(json!({"entity_id": 501})))
            .on_post("/orders/7/comments", json!(true)),
    );
    let params: UpdateOrderParams = serde_json::from_value(json!({
        "id": "7",
        "updates": {
            "billingAddress": {"firstName": "Jane", "city": "Dallas", "countryCode": "US"},
            "status": "processing",
            "notes": "moved"
        }
    }))
    .unwrap();

    bridge.try_update_order(&params).await.unwrap();

    assert_eq!(
        bridge.transport().call_log(),
        ["GET /orders/7", "PUT /orders/7", "POST /orders/7/comments", "GET /orders/7"]
    );
    let calls = bridge.transport().calls();
    let address = &calls[1].body.as_ref().unwrap()["entity"];
    assert_eq!(address["entity_id"], "501");
    assert_eq!(address["city"], "Dallas");
    assert_eq!(address["address_type"], "billing");
    let comment = &calls[2].body.as_ref().unwrap()["statusHistory"];
    assert_eq!(comment["comment"], "moved");
    assert_eq!(comment["status"], "processing");
}

#[tokio::test]
async fn test_cancel_order_refused() {
    let bridge = bridge(MockTransport::new().on_post("/orders/7/cancel", json!(false)));
    let params = CancelOrderParams {
        order_id: "7".to_owned(),
        reason: Some("fraud".to_owned()),
        notes: None,
        notify_customer: false,
    };

    let response = bridge.cancel_order(&params).await;

    assert!(response.error().unwrap().contains("refused to cancel order 7"));
    assert_eq!(bridge.transport().call_log(), ["POST /orders/7/cancel"]);
}

#[tokio::test]
async fn test_cancel_order_records_reason() {
    let bridge = bridge(
        MockTransport::new()
            .on_post("/orders/7/cancel", json!(true))
            .on_post("/orders/7/comments", json!(true))
            .on_get("/orders/7", native_order()),
    );
    let params = CancelOrderParams {
        order_id: "7".to_owned(),
        reason: Some("fraud".to_owned()),
        notes: None,
        notify_customer: true,
    };

    let order = bridge.try_cancel_order(&params).await.unwrap();

    assert_eq!(order.id, "7");
    let comment = bridge.transport().calls()[1].body.clone().unwrap();
    assert_eq!(comment["statusHistory"]["comment"], "Cancellation reason: fraud");
    assert_eq!(comment["statusHistory"]["is_customer_notified"], 1);
}

#[tokio::test]
async fn test_fulfill_order_ships_and_reads_shipment() {
    let bridge = bridge(
        MockTransport::new().on_post("/order/7/ship", json!("9")).on_get(
            "/shipment/9",
            json!({
                "entity_id": 9,
                "order_id": 7,
                "items": [{"order_item_id": 71, "sku": "MB01-red", "qty": 1}],
                "tracks": [{"track_number": "1Z999", "carrier_code": "ups", "title": "UPS"}]
            }),
        ),
    );
    let params: FulfillOrderParams = serde_json::from_value(json!({
        "orderId": "7",
        "lineItems": [{"lineItemId": "71", "quantity": 1}],
        "trackingNumbers": ["1Z999"],
        "shippingCarrier": "ups"
    }))
    .unwrap();

    let fulfillment = bridge.try_fulfill_order(&params).await.unwrap();

    assert_eq!(fulfillment.id, "9");
    assert_eq!(fulfillment.order_id, "7");
    assert_eq!(fulfillment.tracking_numbers, ["1Z999"]);
    let body = bridge.transport().calls()[0].body.clone().unwrap();
    assert_eq!(body["tracks"][0]["carrier_code"], "ups");
}

#[tokio::test]
async fn test_get_inventory_requires_skus_before_any_call() {
    let bridge = bridge(MockTransport::new());

    let response = bridge.get_inventory(&GetInventoryParams::default()).await;

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"success": false, "error": "Validation failed: get-inventory requires at least one SKU"})
    );
    assert!(bridge.transport().calls().is_empty());
}

#[tokio::test]
async fn test_get_inventory_reads_source_items() {
    let bridge = bridge(MockTransport::new().on_get(
        "/inventory/source-items",
        json!({"items": [{"sku": "MB01", "source_code": "default", "quantity": 12, "status": 1}]}),
    ));
    let params = GetInventoryParams { skus: vec!["MB01".to_owned()], location_ids: Vec::new() };

    let records = bridge.try_get_inventory(&params).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].location_id.as_deref(), Some("default"));
    assert_eq!(records[0].available, Some(true));
    let criteria = bridge.transport().calls()[0].criteria.clone().unwrap();
    assert!(criteria.sort_orders.is_none());
    assert_eq!(criteria.page_size, 100);
}

#[tokio::test]
async fn test_get_inventory_falls_back_to_stock_items() {
    let bridge = bridge(
        MockTransport::new()
            .on_get("/stockItems/MB01", json!({"item_id": 1, "product_id": 10, "stock_id": 1, "qty": 5, "is_in_stock": true}))
            .on(HttpMethod::Get, "/stockItems/MB02", Reply::Status(404, "not found")),
    );
    let params = GetInventoryParams {
        skus: vec!["MB01".to_owned(), "MB02".to_owned()],
        location_ids: Vec::new(),
    };

    let records = bridge.try_get_inventory(&params).await.unwrap();

    assert_eq!(
        bridge.transport().call_log(),
        ["GET /inventory/source-items", "GET /stockItems/MB01", "GET /stockItems/MB02"]
    );
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sku, "MB01");
    assert_eq!(records[0].quantity, Some(Decimal::from(5)));
}

#[tokio::test]
async fn test_get_inventory_stock_item_failure_is_reported() {
    let bridge = bridge(
        MockTransport::new()
            .on(HttpMethod::Get, "/stockItems/MB01", Reply::Status(500, "Internal Error"))
            .on(HttpMethod::Get, "/stockItems/MB02", Reply::Timeout),
    );
    let params = GetInventoryParams {
        skus: vec!["MB01".to_owned(), "MB02".to_owned()],
        location_ids: Vec::new(),
    };

    let response = bridge.get_inventory(&params).await;

    assert!(!response.is_success());
    assert!(response.error().unwrap().contains("/stockItems/MB01"));
    assert_eq!(
        bridge.transport().call_log(),
        ["GET /inventory/source-items", "GET /stockItems/MB01"]
    );
}

#[tokio::test]
async fn test_get_inventory_timeout_on_later_sku_is_reported() {
    let bridge = bridge(
        MockTransport::new()
            .on_get("/stockItems/MB01", json!({"item_id": 1, "stock_id": 1, "qty": 5, "is_in_stock": true}))
            .on(HttpMethod::Get, "/stockItems/MB02", Reply::Timeout),
    );
    let params = GetInventoryParams {
        skus: vec!["MB01".to_owned(), "MB02".to_owned()],
        location_ids: Vec::new(),
    };

    let response = bridge.get_inventory(&params).await;

    assert_eq!(response.error(), Some("GET /stockItems/MB02 timed out"));
}

#[tokio::test]
async fn test_get_inventory_server_error_does_not_fall_back() {
    let bridge = bridge(MockTransport::new().on(
        HttpMethod::Get,
        "/inventory/source-items",
        Reply::Status(503, "Service Unavailable"),
    ));
    let params = GetInventoryParams { skus: vec!["MB01".to_owned()], location_ids: Vec::new() };

    assert!(!bridge.get_inventory(&params).await.is_success());
    assert_eq!(bridge.transport().call_log(), ["GET /inventory/source-items"]);
}

#[tokio::test]
async fn test_variant_fan_out_keeps_resolved_parents() {
    let bridge = bridge(
        MockTransport::new()
            .on_get("/products", parent_product(1, "MB01"))
            .on(HttpMethod::Get, "/products", Reply::Status(500, "Internal Error"))
            .on_get("/products/attributes/93", json!({"attribute_id": 93, "attribute_code": "color"}))
            .on(HttpMethod::Get, "/products/attributes/144", Reply::Status(404, "missing"))
            .on_get(
                "/configurable-products/MB01/children",
                json!([
                    {"id": 11, "sku": "MB01-red-s", "price": 45, "custom_attributes": [
                        {"attribute_code": "color", "value": "5"},
                        {"attribute_code": "shirt_size", "value": "8"}
                    ]},
                    {"id": 12, "sku": "MB01-blue-s", "price": 45, "custom_attributes": [
                        {"attribute_code": "color", "value": "6"}
                    ]}
                ]),
            ),
    );
    let params = GetProductVariantsParams {
        product_ids: vec!["1".to_owned(), "2".to_owned()],
        ..Default::default()
    };

    let response = bridge.get_product_variants(&params).await;

    let variants = &response.payload().unwrap().variants;
    assert_eq!(variants.len(), 2);
    assert!(variants.iter().all(|v| v.product_id.as_deref() == Some("1")));
    assert_eq!(variants[0].selected_options.len(), 2);
    assert_eq!(variants[0].selected_options[0].name, "Color");
    assert_eq!(variants[0].selected_options[1].name, "Shirt Size");
    assert_eq!(variants[1].selected_options.len(), 1);
    assert_eq!(variants[0].price.as_ref().unwrap().currency_code, "USD");
}

#[tokio::test]
async fn test_variants_without_parents_search_simple_products() {
    let bridge = bridge(
        MockTransport::new().on_get("/products", json!({"items": [{"id": 11, "sku": "MB01-red-s"}]})),
    );
    let params = GetProductVariantsParams { skus: vec!["MB01-red-s".to_owned()], ..Default::default() };

    let variants = bridge.try_get_product_variants(&params).await.unwrap();

    assert_eq!(variants[0].external_product_id.as_deref(), Some("MB01-red-s"));
    assert!(variants[0].product_id.is_none());
    let criteria = bridge.transport().calls()[0].criteria.clone().unwrap();
    assert_eq!(filters(&criteria)[0], ("type_id".to_owned(), "simple".to_owned(), "eq".to_owned()));
}

#[tokio::test]
async fn test_every_operation_reports_transport_failure_in_envelope() {
    let bridge = bridge(MockTransport::answering_all(Reply::Status(503, "Service Unavailable")));
    let args = [
        (Operation::CreateOrder, json!({"lineItems": [{"sku": "MB01", "quantity": 1}]})),
        (Operation::UpdateOrder, json!({"id": "7", "updates": {"notes": "x"}})),
        (Operation::CancelOrder, json!({"orderId": "7"})),
        (Operation::FulfillOrder, json!({"orderId": "7"})),
        (Operation::CreateReturn, json!({"orderId": "7", "lineItems": [{"lineItemId": "71", "quantity": 1}]})),
        (Operation::GetOrders, json!({})),
        (Operation::GetCustomers, json!({})),
        (Operation::GetProducts, json!({})),
        (Operation::GetProductVariants, json!({})),
        (Operation::GetInventory, json!({"skus": ["MB01"]})),
        (Operation::GetFulfillments, json!({})),
        (Operation::GetReturns, json!({})),
    ];
    assert_eq!(args.len(), Operation::ALL.len());

    for (op, args) in args {
        let response = bridge.execute(op.as_str(), args).await;
        assert_eq!(response["success"], false, "{op}");
        assert!(response["error"].as_str().unwrap().contains("status 503"), "{op}: {response}");
    }
}

#[tokio::test]
async fn test_get_orders_skip_past_last_page_fails_before_any_call() {
    let bridge = bridge(MockTransport::answering_all(Reply::Json(json!({"items": []}))));

    let response = bridge.execute("get-orders", json!({"skip": 4_294_967_295_u64, "pageSize": 1})).await;

    assert_eq!(response["success"], false);
    assert!(response["error"].as_str().unwrap().starts_with("Validation failed"), "{response}");
    assert!(bridge.transport().calls().is_empty());
}

#[tokio::test]
async fn test_execute_rejects_malformed_arguments() {
    let bridge = bridge(MockTransport::new());

    let response = bridge.execute("get-orders", json!({"ids": "7"})).await;
    assert_eq!(response["success"], false);
    assert!(response["error"].as_str().unwrap().starts_with("Invalid input"));

    let response = bridge.execute("delete-order", json!({})).await;
    assert_eq!(response["error"], "Invalid input: unknown operation: delete-order");
    assert!(bridge.transport().calls().is_empty());
}
