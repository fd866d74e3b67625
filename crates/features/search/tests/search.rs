use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sgate_domain::config::ApiConfig;
use sgate_domain::constants::SEARCH_PREFIX;
use sgate_kernel::testing::{StubEmbedder, StubStore, stub_state};
use std::sync::Arc;
use tower::ServiceExt;

fn app(embedder: Arc<StubEmbedder>, store: Arc<StubStore>) -> Router {
    let state = stub_state(ApiConfig::default(), embedder, store).expect("state");
    let (router, _) = sgate_search::router().split_for_parts();
    Router::new().nest(SEARCH_PREFIX, router).with_state(state)
}

async fn post(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::post(SEARCH_PREFIX)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn returns_ranked_results() {
    let embedder = Arc::new(StubEmbedder::default());
    let store = Arc::new(StubStore::seeded());

    let (status, body) =
        post(app(embedder.clone(), store.clone()), json!({ "query": "  refunds  " })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "refunds");
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["id"], "doc-1");
    assert_eq!(body["results"][0]["contentType"], "page");
    assert!(body["tookMs"].is_u64());
    assert_eq!(embedder.inputs(), vec!["refunds".to_owned()]);
}

#[tokio::test]
async fn filters_reach_the_store() {
    let store = Arc::new(StubStore::seeded());
    let body = json!({
        "query": "refunds",
        "contentTypes": ["page", " "],
        "locales": ["en"],
        "limit": 1,
        "threshold": 0.8
    });

    let (status, body) = post(app(Arc::new(StubEmbedder::default()), store.clone()), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    let searches = store.searches();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].content_types, vec!["page"]);
    assert_eq!(searches[0].limit, 1);
}

#[tokio::test]
async fn blank_query_is_rejected_before_embedding() {
    let embedder = Arc::new(StubEmbedder::default());
    let (status, body) =
        post(app(embedder.clone(), Arc::new(StubStore::seeded())), json!({ "query": "   " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn missing_query_field_is_a_bad_request() {
    let (status, _) =
        post(app(Arc::new(StubEmbedder::default()), Arc::new(StubStore::seeded())), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn embedding_failure_is_a_bad_gateway() {
    let store = Arc::new(StubStore::seeded());
    let (status, _) =
        post(app(Arc::new(StubEmbedder::failing()), store.clone()), json!({ "query": "x" })).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn store_failure_is_a_bad_gateway() {
    let (status, _) =
        post(app(Arc::new(StubEmbedder::default()), Arc::new(StubStore::failing())), json!({ "query": "x" }))
            .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
