use sgate_domain::models::{AnalyticsKind, ContentDocument, FilterOptions, SearchHit};
use serde_json::json;

#[test]
fn store_rows_and_client_payloads_share_models() {
    let row = json!({
        "id": "doc-1",
        "title": "Getting started",
        "content_type": "guide",
        "locale": "en",
        "similarity": 0.91
    });
    let hit: SearchHit = serde_json::from_value(row).expect("snake_case row");
    assert_eq!(hit.content_type, "guide");
    assert!(hit.url.is_none());

    let out = serde_json::to_value(&hit).expect("serialize");
    assert_eq!(out["contentType"], "guide");
    assert!(out.get("content_type").is_none());
}

#[test]
fn filter_options_serialize_camel_case() {
    let opts = FilterOptions { content_types: vec!["blog".into()], locales: vec!["en".into()] };
    let out = serde_json::to_value(&opts).expect("serialize");
    assert_eq!(out, json!({ "contentTypes": ["blog"], "locales": ["en"] }));
}

#[test]
fn embedding_text_falls_back_to_title() {
    let mut doc: ContentDocument = serde_json::from_value(json!({
        "id": "1", "title": "Pricing", "contentType": "page", "locale": "de"
    }))
    .expect("document");
    assert_eq!(doc.embedding_text(), "Pricing");

    doc.content = "Plans and tiers".into();
    assert_eq!(doc.embedding_text(), "Pricing\n\nPlans and tiers");
}

#[test]
fn analytics_kinds_are_snake_case() {
    let kind: AnalyticsKind = serde_json::from_value(json!("filter_change")).expect("kind");
    assert_eq!(kind, AnalyticsKind::FilterChange);
    assert!(serde_json::from_value::<AnalyticsKind>(json!("purchase")).is_err());
}
