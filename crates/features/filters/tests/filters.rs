use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sgate_domain::config::ApiConfig;
use sgate_domain::constants::FILTERS_PREFIX;
use sgate_kernel::testing::{StubEmbedder, StubStore, stub_state};
use std::sync::Arc;
use tower::ServiceExt;

async fn get(store: StubStore) -> (StatusCode, Value) {
    let state =
        stub_state(ApiConfig::default(), Arc::new(StubEmbedder::default()), Arc::new(store))
            .expect("state");
    let (router, _) = sgate_filters::router().split_for_parts();
    let app = Router::new().nest(FILTERS_PREFIX, router).with_state(state);

    let request = Request::get(FILTERS_PREFIX).body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn lists_facets() {
    let (status, body) = get(StubStore::seeded()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "contentTypes": ["blog", "page"], "locales": ["en", "fr"] }));
}

#[tokio::test]
async fn empty_store_gives_empty_lists() {
    let (status, body) = get(StubStore::default()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contentTypes"], json!([]));
    assert_eq!(body["locales"], json!([]));
}

#[tokio::test]
async fn store_failure_is_a_bad_gateway() {
    let (status, body) = get(StubStore::failing()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Upstream service unavailable");
}
