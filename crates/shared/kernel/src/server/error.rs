use super::state::ApiStateError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sgate_embeddings::EmbeddingError;
use sgate_store::StoreError;
use std::borrow::Cow;
use std::error::Error as StdError;

/// The closed set of failures a handler can report.
///
/// Client-side kinds carry messages we wrote ourselves and are shown as-is. Upstream,
/// timeout and internal kinds carry downstream text that only development builds of the
/// response ever see; see [`crate::server::middleware::error_envelope`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: Cow<'static, str> },

    #[error("{message}")]
    Unauthorized { message: Cow<'static, str> },

    #[error("{message}")]
    Forbidden { message: Cow<'static, str> },

    #[error("{message}")]
    NotFound { message: Cow<'static, str> },

    #[error("{message}")]
    PayloadTooLarge { message: Cow<'static, str> },

    #[error("{message}")]
    UnsupportedMediaType { message: Cow<'static, str> },

    #[error("{service} request failed: {message}")]
    Upstream { service: &'static str, message: String, causes: Vec<String> },

    #[error("{service} did not answer in time: {message}")]
    Timeout { service: &'static str, message: String },

    #[error("{message}")]
    Internal { message: Cow<'static, str>, causes: Vec<String> },
}

impl ApiError {
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Internal { message: message.into(), causes: Vec::new() }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show outside development.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::BadRequest { .. }
            | Self::Unauthorized { .. }
            | Self::Forbidden { .. }
            | Self::NotFound { .. }
            | Self::PayloadTooLarge { .. }
            | Self::UnsupportedMediaType { .. } => self.to_string(),
            Self::Upstream { .. } => "Upstream service unavailable".to_owned(),
            Self::Timeout { .. } => "Upstream service timed out".to_owned(),
            Self::Internal { .. } => "Internal Server Error".to_owned(),
        }
    }

    /// This error's own text followed by its underlying causes, outermost first.
    #[must_use]
    pub fn stack(&self) -> Vec<String> {
        let mut stack = vec![self.to_string()];
        if let Self::Upstream { causes, .. } | Self::Internal { causes, .. } = self {
            stack.extend(causes.iter().cloned());
        }
        stack
    }
}

/// JSON body of every error response.
#[sgate_derive::api_model]
pub struct ErrorBody {
    /// Canonical reason phrase of the status code.
    pub error: String,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Cause chain; development only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<String>>,
}

impl ErrorBody {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: status.canonical_reason().unwrap_or("Error").to_owned(),
            message: message.into(),
            timestamp: super::timestamp(),
            request_id: None,
            stack: None,
        }
    }
}

/// Attached to error responses so the terminal handler can log the full error and
/// decide how much of it the client sees.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub message: String,
    pub public_message: String,
    pub stack: Vec<String>,
}

impl From<&ApiError> for ErrorReport {
    fn from(err: &ApiError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
            public_message: err.public_message(),
            stack: err.stack(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let report = ErrorReport::from(&self);
        let body = ErrorBody::new(report.status, report.public_message.clone());
        let mut response = (report.status, Json(body)).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

fn causes(err: &dyn StdError) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        out.push(cause.to_string());
        current = cause.source();
    }
    out
}

impl From<EmbeddingError> for ApiError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::InvalidInput { message, .. } => Self::BadRequest { message },
            EmbeddingError::Timeout { .. } => {
                Self::Timeout { service: "embeddings", message: err.to_string() }
            }
            EmbeddingError::Config { .. } => {
                Self::Internal { message: err.to_string().into(), causes: causes(&err) }
            }
            _ => Self::Upstream {
                service: "embeddings",
                message: err.to_string(),
                causes: causes(&err),
            },
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout { .. } => Self::Timeout { service: "store", message: err.to_string() },
            StoreError::Config { .. } => {
                Self::Internal { message: err.to_string().into(), causes: causes(&err) }
            }
            _ => Self::Upstream { service: "store", message: err.to_string(), causes: causes(&err) },
        }
    }
}

impl From<ApiStateError> for ApiError {
    fn from(err: ApiStateError) -> Self {
        Self::Internal { message: err.to_string().into(), causes: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_kind() {
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::internal("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
        let timeout = ApiError::Timeout { service: "store", message: "slow".into() };
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn downstream_text_is_not_public() {
        let err: ApiError =
            StoreError::Status { status: 401, context: Some("filter options".into()) }.into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("HTTP 401"));
        assert!(!err.public_message().contains("401"));
    }

    #[test]
    fn client_messages_stay_public() {
        let err = ApiError::bad_request("query must not be empty");
        assert_eq!(err.public_message(), "query must not be empty");
    }

    #[test]
    fn invalid_embedding_input_is_a_client_error() {
        let err: ApiError =
            EmbeddingError::InvalidInput { message: "text to embed is empty".into(), context: None }
                .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn response_carries_report() {
        let response = ApiError::internal("boom").into_response();
        let report = response.extensions().get::<ErrorReport>().expect("report");
        assert_eq!(report.message, "boom");
        assert_eq!(report.public_message, "Internal Server Error");
        assert_eq!(report.stack, vec!["boom".to_owned()]);
    }

    #[test]
    fn stack_starts_with_the_error_itself() {
        let err: ApiError = StoreError::Decode {
            message: "expected an array".into(),
            context: Some("filter options".into()),
        }
        .into();
        let stack = err.stack();
        assert_eq!(stack.first(), Some(&err.to_string()));
    }
}
