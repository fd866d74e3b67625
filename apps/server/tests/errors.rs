mod common;

use axum::http::StatusCode;
use common::{app_with, config};
use serde_json::json;
use sgate::domain::config::Environment;
use sgate_kernel::testing::{STUB_FAILURE, StubEmbedder, StubStore};

#[tokio::test]
async fn production_hides_upstream_details() {
    let app = app_with(config(Environment::Production), StubEmbedder::failing(), StubStore::seeded());
    let reply = app.post_json("/api/search", &json!({ "query": "refunds" })).await;

    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert_eq!(reply.json["message"], "Upstream service unavailable");
    assert!(reply.json.get("stack").is_none());
    assert!(!reply.raw.contains(STUB_FAILURE));
}

#[tokio::test]
async fn development_shows_the_raw_message() {
    let app = app_with(config(Environment::Development), StubEmbedder::default(), StubStore::failing());
    let reply = app.get("/api/filters").await;

    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert!(reply.json["message"].as_str().unwrap_or("").contains(STUB_FAILURE));

    let stack = reply.json["stack"].as_array().expect("stack in development");
    assert_eq!(stack.first(), Some(&reply.json["message"]));
}

#[tokio::test]
async fn development_stacks_client_errors_too() {
    let app = app_with(config(Environment::Development), StubEmbedder::default(), StubStore::seeded());
    let reply = app.get("/api/blogs/no-such-post").await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json["stack"], json!(["Blog post no-such-post not found"]));
}

#[tokio::test]
async fn client_errors_keep_their_message_everywhere() {
    for env in [Environment::Production, Environment::Development] {
        let app = app_with(config(env), StubEmbedder::default(), StubStore::seeded());
        let reply = app.get("/api/blogs/no-such-post").await;

        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.json["message"], "Blog post no-such-post not found");
    }
}

#[tokio::test]
async fn readiness_degrades_without_leaking() {
    let app = app_with(config(Environment::Staging), StubEmbedder::failing(), StubStore::seeded());
    let reply = app.get("/api/health").await;

    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(reply.json["status"], "degraded");
    assert!(!reply.raw.contains(STUB_FAILURE));
}
