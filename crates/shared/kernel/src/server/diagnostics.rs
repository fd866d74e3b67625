//! Human-callable endpoints that prove the pipeline and the downstream services work.

use super::extract::Payload;
use super::connectivity::{CheckOutcome, CheckStatus, check_embeddings, check_store};
use super::state::ApiState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::Value;
use sgate_derive::{api_handler, api_model};
use sgate_domain::constants::{
    ANALYTICS_PREFIX, BLOGS_PREFIX, DIAGNOSTICS_TAG, FILTERS_PREFIX, SEARCH_PREFIX, STATUS_PREFIX,
    SYSTEM_TAG, WEBHOOK_PREFIX,
};

#[api_model]
pub(crate) struct Endpoints {
    search: &'static str,
    filters: &'static str,
    analytics: &'static str,
    webhook: &'static str,
    blogs: &'static str,
    health: &'static str,
    docs: &'static str,
}

#[api_model]
pub(crate) struct WelcomeResponse {
    message: &'static str,
    version: &'static str,
    environment: &'static str,
    endpoints: Endpoints,
}

#[api_model]
pub(crate) struct EchoResponse {
    message: &'static str,
    method: &'static str,
    timestamp: String,
    /// Parsed request body (POST only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
}

#[api_model]
pub(crate) struct ServiceOutcomes {
    openai: CheckOutcome,
    supabase: CheckOutcome,
}

#[api_model]
pub(crate) struct ServicesResponse {
    status: CheckStatus,
    services: ServiceOutcomes,
    timestamp: String,
}

fn check_status(outcome: &CheckOutcome) -> StatusCode {
    if outcome.is_success() { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR }
}

#[api_handler(
    get,
    path = "/",
    responses((status = OK, description = "Welcome payload listing the mounted prefixes", body = WelcomeResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn welcome(State(state): State<ApiState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Content search gateway",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.environment().as_str(),
        endpoints: Endpoints {
            search: SEARCH_PREFIX,
            filters: FILTERS_PREFIX,
            analytics: ANALYTICS_PREFIX,
            webhook: WEBHOOK_PREFIX,
            blogs: BLOGS_PREFIX,
            health: STATUS_PREFIX,
            docs: "/api/docs",
        },
    })
}

#[api_handler(
    get,
    path = "/favicon.ico",
    responses((status = NO_CONTENT, description = "No icon; keeps browser noise out of the logs")),
    tag = SYSTEM_TAG,
)]
pub(super) async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[api_handler(
    get,
    path = "/api/test",
    responses((status = OK, body = EchoResponse)),
    tag = DIAGNOSTICS_TAG,
)]
pub(super) async fn echo_get() -> Json<EchoResponse> {
    Json(EchoResponse {
        message: "API is working",
        method: "GET",
        timestamp: super::timestamp(),
        body: None,
    })
}

#[api_handler(
    post,
    path = "/api/test",
    responses(
        (status = OK, description = "Echoes the parsed body", body = EchoResponse),
        (status = BAD_REQUEST, body = super::ErrorBody),
        (status = PAYLOAD_TOO_LARGE, body = super::ErrorBody),
        (status = UNSUPPORTED_MEDIA_TYPE, body = super::ErrorBody),
    ),
    tag = DIAGNOSTICS_TAG,
)]
pub(super) async fn echo_post(payload: Option<Payload<Value>>) -> Json<EchoResponse> {
    let body = payload.map_or_else(|| Value::Object(serde_json::Map::new()), |Payload(v)| v);
    Json(EchoResponse {
        message: "POST request received",
        method: "POST",
        timestamp: super::timestamp(),
        body: Some(body),
    })
}

#[api_handler(
    get,
    path = "/api/test-openai",
    responses(
        (status = OK, description = "Embedding provider reachable", body = CheckOutcome),
        (status = INTERNAL_SERVER_ERROR, description = "Embedding provider failed. The message is generic outside development", body = CheckOutcome),
    ),
    tag = DIAGNOSTICS_TAG,
)]
pub(super) async fn test_openai(State(state): State<ApiState>) -> (StatusCode, Json<CheckOutcome>) {
    let outcome = check_embeddings(state.embedder.as_ref(), state.environment()).await;
    (check_status(&outcome), Json(outcome))
}

#[api_handler(
    get,
    path = "/api/test-supabase",
    responses(
        (status = OK, description = "Store reachable", body = CheckOutcome),
        (status = INTERNAL_SERVER_ERROR, description = "Store failed. The message is generic outside development", body = CheckOutcome),
    ),
    tag = DIAGNOSTICS_TAG,
)]
pub(super) async fn test_supabase(State(state): State<ApiState>) -> (StatusCode, Json<CheckOutcome>) {
    let outcome = check_store(state.store.as_ref(), state.environment()).await;
    (check_status(&outcome), Json(outcome))
}

#[api_handler(
    get,
    path = "/api/test-services",
    responses(
        (status = OK, description = "Both services reachable", body = ServicesResponse),
        (status = INTERNAL_SERVER_ERROR, description = "At least one service failed. Messages are generic outside development", body = ServicesResponse),
    ),
    tag = DIAGNOSTICS_TAG,
)]
pub(super) async fn test_services(
    State(state): State<ApiState>,
) -> (StatusCode, Json<ServicesResponse>) {
    let env = state.environment();
    let (openai, supabase) = tokio::join!(
        check_embeddings(state.embedder.as_ref(), env),
        check_store(state.store.as_ref(), env),
    );

    let (status, code) = if openai.is_success() && supabase.is_success() {
        (CheckStatus::Success, StatusCode::OK)
    } else {
        (CheckStatus::Error, StatusCode::INTERNAL_SERVER_ERROR)
    };

    let body = ServicesResponse {
        status,
        services: ServiceOutcomes { openai, supabase },
        timestamp: super::timestamp(),
    };
    (code, Json(body))
}
