use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sgate_domain::config::{ApiConfig, Secret};
use sgate_domain::constants::{WEBHOOK_PREFIX, WEBHOOK_SECRET_HEADER};
use sgate_kernel::testing::{StubEmbedder, StubStore, stub_state};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "cms-shared-secret";

struct Harness {
    embedder: Arc<StubEmbedder>,
    store: Arc<StubStore>,
    app: Router,
}

fn harness(secret: Option<&str>) -> Harness {
    let mut config = ApiConfig::default();
    config.webhooks.secret = secret.map(Secret::new);
    let embedder = Arc::new(StubEmbedder::new(8));
    let store = Arc::new(StubStore::seeded());
    let state = stub_state(config, embedder.clone(), store.clone()).expect("state");
    let (router, _) = sgate_webhooks::router().split_for_parts();
    Harness { embedder, store, app: Router::new().nest(WEBHOOK_PREFIX, router).with_state(state) }
}

async fn send(app: Router, secret: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut request = Request::post(format!("{WEBHOOK_PREFIX}/content"))
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(secret) = secret {
        request = request.header(WEBHOOK_SECRET_HEADER, secret);
    }
    let response = app
        .oneshot(request.body(Body::from(body.to_string())).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn upsert() -> Value {
    json!({
        "action": "upsert",
        "document": {
            "id": "doc-9",
            "title": "Returns",
            "content": "Send it back within 30 days.",
            "contentType": "page",
            "locale": "en"
        }
    })
}

#[tokio::test]
async fn upsert_embeds_title_and_content() {
    let h = harness(Some(SECRET));

    let (status, body) = send(h.app, Some(SECRET), upsert()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "indexed", "id": "doc-9" }));
    assert_eq!(h.embedder.inputs(), vec!["Returns\n\nSend it back within 30 days.".to_owned()]);
    let upserts = h.store.upserts();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].0.id, "doc-9");
    assert_eq!(upserts[0].1, 8);
}

#[tokio::test]
async fn delete_removes_by_id() {
    let h = harness(Some(SECRET));
    let body = json!({ "action": "delete", "document": { "id": "doc-1" } });

    let (status, body) = send(h.app, Some(SECRET), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");
    assert_eq!(h.store.deletes(), vec!["doc-1".to_owned()]);
    assert_eq!(h.embedder.calls(), 0);
}

#[tokio::test]
async fn wrong_or_missing_secret_is_unauthorized() {
    for presented in [Some("nope"), None] {
        let h = harness(Some(SECRET));
        let (status, body) = send(h.app, presented, upsert()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid webhook secret");
        assert_eq!(h.store.calls(), 0);
    }
}

#[tokio::test]
async fn unconfigured_secret_rejects_calls() {
    let h = harness(None);
    let (status, _) = send(h.app, Some(""), upsert()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upsert_without_locale_is_a_bad_request() {
    let h = harness(Some(SECRET));
    let mut body = upsert();
    body["document"]["locale"] = Value::Null;

    let (status, body) = send(h.app, Some(SECRET), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "document.locale is required");
    assert_eq!(h.embedder.calls(), 0);
}

#[tokio::test]
async fn unknown_action_is_a_bad_request() {
    let h = harness(Some(SECRET));
    let body = json!({ "action": "archive", "document": { "id": "doc-1" } });
    let (status, _) = send(h.app, Some(SECRET), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn secret_is_checked_before_the_body() {
    let h = harness(Some(SECRET));
    let (status, _) = send(h.app, Some("nope"), json!({ "garbage": true })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
