use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use sgate_domain::config::ApiConfig;
use sgate_domain::constants::BLOGS_PREFIX;
use sgate_kernel::testing::{StubEmbedder, StubStore, stub_state};
use std::sync::Arc;
use tower::ServiceExt;

async fn get(store: StubStore, path: &str) -> (StatusCode, Value) {
    let state =
        stub_state(ApiConfig::default(), Arc::new(StubEmbedder::default()), Arc::new(store))
            .expect("state");
    let (router, _) = sgate_blogs::router().split_for_parts();
    let app = Router::new().nest(BLOGS_PREFIX, router).with_state(state);

    let request = Request::get(format!("{BLOGS_PREFIX}{path}")).body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn lists_all_posts() {
    let (status, body) = get(StubStore::seeded(), "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["posts"][0]["slug"], "hello-world");
    assert_eq!(body["posts"][0]["publishedAt"], "2026-01-02T00:00:00Z");
}

#[tokio::test]
async fn filters_by_locale_and_pages() {
    let (_, body) = get(StubStore::seeded(), "?locale=fr").await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["posts"][0]["slug"], "bonjour");

    let (_, body) = get(StubStore::seeded(), "?limit=1&offset=1").await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["posts"][0]["slug"], "bonjour");
}

#[tokio::test]
async fn bad_paging_is_a_bad_request() {
    let (status, _) = get(StubStore::seeded(), "?limit=500").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(StubStore::seeded(), "?offset=minus-one").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn fetches_post_by_slug() {
    let (status, body) = get(StubStore::seeded(), "/hello-world").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Hello world");
    assert_eq!(body["author"], "Team");
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let (status, body) = get(StubStore::seeded(), "/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Blog post missing not found");
}

#[tokio::test]
async fn store_failure_is_a_bad_gateway() {
    let (status, _) = get(StubStore::failing(), "").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
