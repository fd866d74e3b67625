//! CMS content webhook: keeps the vector index in sync with published documents.
//!
//! Callers authenticate with a shared secret in `x-webhook-secret`. With no secret
//! configured every call is rejected.

use axum::Json;
use axum::extract::{FromRequestParts, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use sgate_derive::{api_handler, api_model};
use sgate_domain::config::Secret;
use sgate_domain::constants::{CONTENT_TAG, WEBHOOK_SECRET_HEADER};
use sgate_domain::models::ContentDocument;
use sgate_kernel::server::{ApiError, ApiState, ErrorBody, Payload};
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[api_model(rename_all = "lowercase")]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum WebhookAction {
    Upsert,
    Delete,
}

/// Document fields as sent by the CMS. Only `id` is needed for deletes.
#[api_model]
pub struct WebhookDocument {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[api_model]
pub struct WebhookRequest {
    pub action: WebhookAction,
    pub document: WebhookDocument,
}

#[api_model]
pub struct WebhookResponse {
    /// `indexed` or `deleted`
    pub status: String,
    pub id: String,
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("document.{field} is required")))
}

impl WebhookDocument {
    fn into_content(self, id: String) -> Result<ContentDocument, ApiError> {
        Ok(ContentDocument {
            id,
            title: required("title", self.title)?,
            content: self.content.unwrap_or_default(),
            url: self.url,
            content_type: required("contentType", self.content_type)?,
            locale: required("locale", self.locale)?,
            updated_at: self.updated_at,
        })
    }
}

/// Compares the presented secret with the configured one in constant time.
fn authorize(expected: Option<&Secret>, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = expected.filter(|s| !s.is_empty()) else {
        warn!("Webhook call rejected: no secret configured");
        return Err(ApiError::unauthorized("Invalid webhook secret"));
    };
    let presented = headers
        .get(WEBHOOK_SECRET_HEADER)
        .map(|v| v.as_bytes())
        .unwrap_or_default();

    if bool::from(expected.expose().as_bytes().ct_eq(presented)) {
        Ok(())
    } else {
        warn!("Webhook call rejected: secret mismatch");
        Err(ApiError::unauthorized("Invalid webhook secret"))
    }
}

/// Extractor that admits only callers presenting the configured secret.
///
/// Runs before the body is read, so bad credentials win over a bad payload.
#[derive(Debug)]
pub struct WebhookCaller;

impl FromRequestParts<ApiState> for WebhookCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, ApiError> {
        authorize(state.config.webhooks.secret.as_ref(), &parts.headers).map(|()| Self)
    }
}

#[api_handler(
    post,
    path = "/content",
    request_body = WebhookRequest,
    params(("x-webhook-secret" = String, Header, description = "Shared webhook secret")),
    responses(
        (status = OK, description = "Document indexed or deleted", body = WebhookResponse),
        (status = BAD_REQUEST, description = "Malformed document", body = ErrorBody),
        (status = UNAUTHORIZED, description = "Missing or wrong secret", body = ErrorBody),
        (status = BAD_GATEWAY, description = "Embedding provider or store failed", body = ErrorBody),
    ),
    tag = CONTENT_TAG,
)]
pub(crate) async fn content(
    State(state): State<ApiState>,
    _caller: WebhookCaller,
    Payload(request): Payload<WebhookRequest>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let id = request.document.id.trim().to_owned();
    if id.is_empty() {
        return Err(ApiError::bad_request("document.id is required"));
    }

    let status = match request.action {
        WebhookAction::Upsert => {
            let document = request.document.into_content(id.clone())?;
            let embedding = state.embedder.generate_embedding(&document.embedding_text()).await?;
            state.store.upsert_document(&document, &embedding).await?;
            info!(id = %id, content_type = %document.content_type, "Document indexed");
            "indexed"
        }
        WebhookAction::Delete => {
            state.store.delete_document(&id).await?;
            info!(id = %id, "Document removed from index");
            "deleted"
        }
    };

    Ok(Json(WebhookResponse { status: status.to_owned(), id }))
}

/// Routes of the webhook module, mounted under `/api/webhook`.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(secret: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(WEBHOOK_SECRET_HEADER, HeaderValue::from_static(secret));
        headers
    }

    #[test]
    fn secret_must_match_exactly() {
        let secret = Secret::new("hunter2");
        assert!(authorize(Some(&secret), &headers("hunter2")).is_ok());
        assert!(authorize(Some(&secret), &headers("hunter")).is_err());
        assert!(authorize(Some(&secret), &HeaderMap::new()).is_err());
    }

    #[test]
    fn unset_or_blank_secret_rejects_everything() {
        assert!(authorize(None, &headers("anything")).is_err());
        assert!(authorize(Some(&Secret::new("")), &headers("")).is_err());
    }

    #[test]
    fn upsert_needs_title_type_and_locale() {
        let doc = WebhookDocument {
            id: "a".into(),
            title: Some("Title".into()),
            content: None,
            url: None,
            content_type: Some("page".into()),
            locale: None,
            updated_at: None,
        };
        let err = doc.into_content("a".into()).expect_err("locale missing");
        assert_eq!(err.to_string(), "document.locale is required");
    }
}
