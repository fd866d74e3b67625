#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use sgate::domain::config::{ApiConfig, Environment, Secret};
use sgate_kernel::testing::{StubEmbedder, StubStore};
use sgate_server::Server;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ORIGIN: &str = "http://localhost:3000";
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

pub struct TestApp {
    pub router: Router,
    pub embedder: Arc<StubEmbedder>,
    pub store: Arc<StubStore>,
    _assets: TempDir,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub raw: String,
    pub json: Value,
}

pub fn config(env: Environment) -> ApiConfig {
    let mut cfg = ApiConfig::default();
    cfg.environment = env;
    cfg.http.allowed_origin = ORIGIN.to_owned();
    cfg.webhooks.secret = Some(Secret::new(WEBHOOK_SECRET));
    cfg
}

pub fn app(env: Environment) -> TestApp {
    app_with(config(env), StubEmbedder::default(), StubStore::seeded())
}

pub fn app_with(mut cfg: ApiConfig, embedder: StubEmbedder, store: StubStore) -> TestApp {
    let assets = tempfile::tempdir().expect("temp dir");
    std::fs::write(assets.path().join("robots.txt"), "User-agent: *\n").expect("asset");
    cfg.http.static_dir = assets.path().to_path_buf();

    let embedder = Arc::new(embedder);
    let store = Arc::new(store);
    let server = Server::builder()
        .config(cfg)
        .embedder(embedder.clone())
        .store(store.clone())
        .build()
        .expect("server");

    TestApp { router: server.router(), embedder, store, _assets: assets }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let raw = String::from_utf8_lossy(&bytes).into_owned();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Reply { status, headers, raw, json }
    }

    pub async fn get(&self, uri: &str) -> Reply {
        self.send(Request::get(uri).body(Body::empty()).expect("request")).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Reply {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        self.send(request).await
    }
}
