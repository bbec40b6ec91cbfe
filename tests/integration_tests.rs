use landing_metrics::config::MarketLayout;
use landing_metrics::derived::compute_derived;
use landing_metrics::document::get_path;
use landing_metrics::parser::parse_document;
use serde_json::json;

#[test]
fn test_full_pipeline() {
    let bytes = include_bytes!("fixtures/data.json");
    let doc = parse_document(bytes).expect("Failed to parse document");
    let out = compute_derived(doc, &MarketLayout::default());
    let doc = out.into_value();

    // null rating counts as 0: (4.9 * 112 + 4.6 * 38 + 0 * 14) / 164 = 4.412
    assert_eq!(get_path(&doc, "wb_metrics.reviews_total"), Some(&json!(164)));
    assert_eq!(get_path(&doc, "wb_metrics.rating"), Some(&json!(4.4)));

    // WB's "385" is a string, so orders_delivered is the Ozon figure alone
    assert_eq!(
        doc["total_metrics"],
        json!({
            "market_note": "Ozon + WB",
            "orders_total": 2260,
            "orders_delivered": 1615,
            "gmv_rub": 3060000,
            "payout_rub": 1710000
        })
    );

    // Untouched sections keep their values
    assert_eq!(get_path(&doc, "metrics.rating"), Some(&json!(4.8)));
    assert_eq!(get_path(&doc, "brand.links.deck"), Some(&json!("deck.pdf")));
}

#[test]
fn test_pipeline_is_stable_on_augmented_output() {
    let bytes = include_bytes!("fixtures/data.json");
    let layout = MarketLayout::default();

    let first = compute_derived(parse_document(bytes).unwrap(), &layout).into_value();
    let second = compute_derived(first.clone(), &layout).into_value();

    assert_eq!(first, second);
}
