//! Benchmarks for the pure translation layer.
//!
//! Measures:
//! - search criteria construction and query-pair encoding
//! - native order translation with configurable parent rows
//! - selected-option resolution across many children
//!
//! Run with: `cargo bench --bench translation`

#![allow(clippy::let_underscore_must_use, reason = "Criterion benchmarks ignore results")]
#![allow(clippy::unwrap_used, reason = "benchmark fixtures are static")]
#![allow(missing_docs, reason = "Benchmark functions are self-documenting")]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use m2_commerce_bridge::{
    FieldNamespace,
    criteria::{QueryWindow, build_search_criteria, ids_filter},
    native::{NativeAttribute, NativeOrder, NativeProduct},
    translate::{ParentOption, order, resolve_for_children},
};
use serde_json::json;

fn native_order(lines: usize) -> NativeOrder {
    let items: Vec<_> = (0..lines)
        .flat_map(|i| {
            let parent = i * 2 + 1;
            [
                json!({"item_id": parent, "sku": format!("CFG-{i}"), "product_type": "configurable",
                       "qty_ordered": 1, "price": 45, "row_total": 45, "discount_amount": -5}),
                json!({"item_id": parent + 1, "parent_item_id": parent, "sku": format!("CFG-{i}-red"),
                       "product_type": "simple", "qty_ordered": 1, "price": 0}),
            ]
        })
        .collect();

    serde_json::from_value(json!({
        "entity_id": 7,
        "increment_id": "000000007",
        "state": "processing",
        "status": "processing",
        "store_id": 1,
        "order_currency_code": "USD",
        "grand_total": 90,
        "created_at": "2024-02-01 09:15:00",
        "items": items,
        "billing_address": {"firstname": "Jane", "city": "Austin", "country_id": "US"}
    }))
    .unwrap()
}

fn bench_search_criteria(c: &mut Criterion) {
    let window = QueryWindow {
        created_at_min: Some("2024-01-01T00:00:00Z".to_owned()),
        updated_at_max: Some("2024-06-30T23:59:59+02:00".to_owned()),
        skip: Some(40),
        page_size: Some(20),
        ..QueryWindow::default()
    };
    let ids: Vec<String> = (1..=50).map(|i| i.to_string()).collect();
    let statuses = vec!["pending".to_owned()];

    c.bench_function("search_criteria_build_and_encode", |b| {
        b.iter(|| {
            let filters = [ids_filter("entity_id", &ids), ids_filter("status", &statuses)];
            let criteria =
                build_search_criteria(black_box(&window), filters.into_iter().flatten().collect())
                    .unwrap();
            black_box(criteria.to_query_pairs())
        });
    });
}

fn bench_order_translation(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_to_canonical");
    let ns = FieldNamespace::default();

    for lines in [1, 10, 100] {
        let native = native_order(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &native, |b, native| {
            b.iter(|| black_box(order::to_canonical(black_box(native), &ns, true)));
        });
    }

    group.finish();
}

fn bench_option_resolution(c: &mut Criterion) {
    let options = [
        ParentOption::new("93", "Color").with_code("color"),
        ParentOption::new("144", "Shirt Size"),
        ParentOption::new("150", "Material"),
    ];
    let children: Vec<NativeProduct> = (0..200)
        .map(|i| NativeProduct {
            custom_attributes: vec![
                NativeAttribute::new("color", (i % 7).to_string()),
                NativeAttribute::new("shirt_size", (i % 5).to_string()),
            ],
            ..NativeProduct::default()
        })
        .collect();

    c.bench_function("resolve_for_200_children", |b| {
        b.iter(|| black_box(resolve_for_children(black_box(&options), black_box(&children))));
    });
}

criterion_group!(benches, bench_search_criteria, bench_order_translation, bench_option_resolution);
criterion_main!(benches);
