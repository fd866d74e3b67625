use crate::safe_nanoid;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use sgate_domain::constants::REQUEST_ID_HEADER;
use std::time::Instant;
use tracing::{Instrument, debug, info_span, warn};

const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id of the current request, available as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

fn accept_client_id(value: &HeaderValue) -> Option<String> {
    let id = value.to_str().ok()?.trim();
    let valid = !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    valid.then(|| id.to_owned())
}

/// Assigns a request id (the client's `x-request-id` when sane, a fresh one otherwise),
/// runs the rest of the stack inside a span carrying it, echoes it on the response and
/// logs the outcome.
pub async fn request_logger(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(accept_client_id)
        .unwrap_or_else(|| safe_nanoid!());

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    req.extensions_mut().insert(RequestId(request_id.clone()));

    let span = info_span!("request", id = %request_id, %method, %path);
    let started = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = response.status().as_u16();
    span.in_scope(|| {
        if response.status().is_server_error() {
            warn!(status, elapsed_ms, "Request failed");
        } else {
            debug!(status, elapsed_ms, "Request handled");
        }
    });

    response
}
