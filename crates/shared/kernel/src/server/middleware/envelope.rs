use super::request_log::RequestId;
use crate::server::error::{ApiError, ErrorBody, ErrorReport};
use axum::Json;
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sgate_domain::config::Environment;
use std::any::Any;
use tracing::{debug, error};

/// Settings of the terminal error handler.
#[derive(Debug, Clone, Copy)]
pub struct ErrorEnvelope {
    pub environment: Environment,
}

impl ErrorEnvelope {
    #[must_use]
    pub const fn new(environment: Environment) -> Self {
        Self { environment }
    }
}

/// Terminal error handler.
///
/// Every 4xx/5xx leaving the inner stack ends up here: errors raised as [`ApiError`] are
/// logged and re-rendered, bare error responses from layers (body limit, method
/// mismatch) are turned into the same JSON shape. Outside development the body only
/// carries the public message; in development it carries the raw error text and, under
/// `stack`, that text followed by its cause chain.
pub async fn error_envelope(
    State(envelope): State<ErrorEnvelope>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let request_id = req.extensions().get::<RequestId>().map(|id| id.0.clone());

    let mut response = next.run(req).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let report = match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => report,
        None if is_json(response.headers()) => return response,
        None => bare_report(status, &path),
    };

    if report.status.is_server_error() {
        error!(
            status = report.status.as_u16(),
            %method,
            %path,
            request_id = request_id.as_deref().unwrap_or("-"),
            error = %report.message,
            stack = ?report.stack,
            "Request failed"
        );
    } else {
        debug!(status = report.status.as_u16(), %method, %path, error = %report.message, "Request rejected");
    }

    render(envelope.environment, &report, request_id, response)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

fn bare_report(status: StatusCode, path: &str) -> ErrorReport {
    let reason = status.canonical_reason().unwrap_or("Error");
    let err = match status {
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => {
            ApiError::not_found(format!("Route {path} not found"))
        }
        StatusCode::PAYLOAD_TOO_LARGE => {
            ApiError::PayloadTooLarge { message: "Request body is too large".into() }
        }
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ApiError::UnsupportedMediaType { message: reason.into() },
        StatusCode::UNAUTHORIZED => ApiError::unauthorized(reason),
        StatusCode::FORBIDDEN => ApiError::Forbidden { message: reason.into() },
        s if s.is_server_error() => ApiError::internal(reason),
        _ => ApiError::bad_request(reason),
    };

    let mut report = ErrorReport::from(&err);
    if status != StatusCode::METHOD_NOT_ALLOWED {
        report.status = status;
    }
    report
}

fn render(
    env: Environment,
    report: &ErrorReport,
    request_id: Option<String>,
    original: Response,
) -> Response {
    let dev = env.is_development();
    let message = if dev { &report.message } else { &report.public_message };

    let mut body = ErrorBody::new(report.status, message.clone());
    body.request_id = request_id;
    if dev {
        body.stack = Some(report.stack.clone());
    }

    let (parts, _) = original.into_parts();
    let mut response = (report.status, Json(body)).into_response();
    for (name, value) in &parts.headers {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            response.headers_mut().append(name, value.clone());
        }
    }
    response
}

/// Converts a handler panic into an `Internal` error response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_owned()))
        .unwrap_or_else(|| "non-string panic payload".to_owned());

    ApiError::Internal { message: "Handler panicked".into(), causes: vec![detail] }.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_mismatch_reads_as_not_found() {
        let report = bare_report(StatusCode::METHOD_NOT_ALLOWED, "/health");
        assert_eq!(report.status, StatusCode::NOT_FOUND);
        assert_eq!(report.public_message, "Route /health not found");
    }

    #[test]
    fn bare_statuses_are_preserved() {
        assert_eq!(bare_report(StatusCode::PAYLOAD_TOO_LARGE, "/").status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(bare_report(StatusCode::SERVICE_UNAVAILABLE, "/").status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn panics_become_internal_errors() {
        let response = panic_response(Box::new("kaboom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let report = response.extensions().get::<ErrorReport>().expect("report");
        assert_eq!(report.stack, vec!["Handler panicked".to_owned(), "kaboom".to_owned()]);
    }
}
