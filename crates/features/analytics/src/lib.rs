//! Client-side search analytics: searches, clicks, impressions and filter changes.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use sgate_derive::{api_handler, api_model};
use sgate_domain::constants::CONTENT_TAG;
use sgate_domain::models::{AnalyticsKind, AnalyticsRecord};
use sgate_kernel::server::{ApiError, ApiState, ErrorBody, Payload, timestamp};
use tracing::debug;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

const MAX_QUERY_CHARS: usize = 1000;
const MAX_ID_CHARS: usize = 256;

#[api_model(rename_all = "snake_case")]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Search,
    Click,
    Impression,
    FilterChange,
}

impl From<EventKind> for AnalyticsKind {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Search => Self::Search,
            EventKind::Click => Self::Click,
            EventKind::Impression => Self::Impression,
            EventKind::FilterChange => Self::FilterChange,
        }
    }
}

#[api_model]
pub struct TrackRequest {
    pub event: EventKind,
    #[serde(default)]
    pub query: Option<String>,
    /// Id of the result the event refers to (clicks, impressions)
    #[serde(default)]
    pub result_id: Option<String>,
    /// Zero-based rank of that result
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[api_model]
pub struct TrackResponse {
    pub status: String,
}

fn bounded(field: &str, value: Option<String>, max: usize) -> Result<Option<String>, ApiError> {
    let Some(value) = value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > max {
        return Err(ApiError::bad_request(format!("{field} must be at most {max} characters")));
    }
    Ok(Some(value))
}

impl TrackRequest {
    fn into_record(self, occurred_at: String) -> Result<AnalyticsRecord, ApiError> {
        Ok(AnalyticsRecord {
            event: self.event.into(),
            query: bounded("query", self.query, MAX_QUERY_CHARS)?,
            result_id: bounded("resultId", self.result_id, MAX_ID_CHARS)?,
            position: self.position,
            session_id: bounded("sessionId", self.session_id, MAX_ID_CHARS)?,
            occurred_at,
        })
    }
}

#[api_handler(
    post,
    path = "/track",
    request_body = TrackRequest,
    responses(
        (status = ACCEPTED, description = "Event recorded", body = TrackResponse),
        (status = BAD_REQUEST, description = "Unknown event kind or oversized field", body = ErrorBody),
        (status = BAD_GATEWAY, description = "Store failed", body = ErrorBody),
    ),
    tag = CONTENT_TAG,
)]
pub(crate) async fn track(
    State(state): State<ApiState>,
    Payload(request): Payload<TrackRequest>,
) -> Result<(StatusCode, Json<TrackResponse>), ApiError> {
    let record = request.into_record(timestamp())?;
    state.store.record_event(&record).await?;
    debug!(event = ?record.event, "Analytics event recorded");

    Ok((StatusCode::ACCEPTED, Json(TrackResponse { status: "recorded".to_owned() })))
}

/// Routes of the analytics module, mounted under `/api/analytics`.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(track))
}
