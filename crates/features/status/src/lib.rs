//! Readiness: checks both downstream services and reports whether the gateway can serve.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use sgate_derive::{api_handler, api_model};
use sgate_domain::constants::SYSTEM_TAG;
use sgate_kernel::server::connectivity::{CheckOutcome, check_embeddings, check_store};
use sgate_kernel::server::{ApiState, timestamp};
use tracing::warn;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[api_model(rename_all = "lowercase")]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Healthy,
    Degraded,
}

#[api_model]
pub struct ReadinessServices {
    pub embeddings: CheckOutcome,
    pub store: CheckOutcome,
}

#[api_model]
pub struct ReadinessResponse {
    pub status: Readiness,
    pub timestamp: String,
    pub services: ReadinessServices,
}

#[api_handler(
    get,
    path = "/",
    responses(
        (status = OK, description = "Both services reachable", body = ReadinessResponse),
        (status = SERVICE_UNAVAILABLE, description = "At least one service failed its check", body = ReadinessResponse),
    ),
    tag = SYSTEM_TAG,
)]
pub(crate) async fn readiness(
    State(state): State<ApiState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let env = state.environment();
    let (embeddings, store) = tokio::join!(
        check_embeddings(state.embedder.as_ref(), env),
        check_store(state.store.as_ref(), env),
    );

    let (status, code) = if embeddings.is_success() && store.is_success() {
        (Readiness::Healthy, StatusCode::OK)
    } else {
        warn!(
            embeddings = embeddings.is_success(),
            store = store.is_success(),
            "Readiness check degraded"
        );
        (Readiness::Degraded, StatusCode::SERVICE_UNAVAILABLE)
    };

    let body = ReadinessResponse {
        status,
        timestamp: timestamp(),
        services: ReadinessServices { embeddings, store },
    };
    (code, Json(body))
}

/// Routes of the status module, mounted under `/api/health`.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(readiness))
}
