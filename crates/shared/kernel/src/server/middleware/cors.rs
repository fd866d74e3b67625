use crate::server::error::ApiError;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, HeaderName, HeaderValue, ORIGIN,
};
use axum::http::{HeaderMap, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sgate_domain::config::HttpConfig;
use sgate_domain::constants::REQUEST_ID_HEADER;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::debug;

pub const ALLOWED_METHODS: [Method; 5] =
    [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(600);

#[sgate_derive::sgate_error]
pub enum CorsError {
    #[error("Invalid CORS origin{}: {message}", format_context(.context))]
    Origin { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Invalid CORS header name{}: {message}", format_context(.context))]
    Header { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Single-origin CORS policy with credentials.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origin: HeaderValue,
    headers: Vec<HeaderName>,
}

impl CorsPolicy {
    /// # Errors
    /// Fails when the origin or one of the header names is not a valid header token.
    pub fn from_config(http: &HttpConfig) -> Result<Self, CorsError> {
        let origin = http.allowed_origin.trim().trim_end_matches('/');
        if origin.is_empty() || origin == "*" {
            return Err(CorsError::Origin {
                message: "a single explicit origin is required with credentials".into(),
                context: Some("http.allowed_origin".into()),
            });
        }
        let origin = HeaderValue::from_str(origin).map_err(|_| CorsError::Origin {
            message: origin.to_owned().into(),
            context: Some("http.allowed_origin".into()),
        })?;

        let headers = http
            .allowed_headers
            .iter()
            .map(|name| {
                HeaderName::try_from(name.trim()).map_err(|_| CorsError::Header {
                    message: name.clone().into(),
                    context: Some("http.allowed_headers".into()),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { origin, headers })
    }

    /// The `tower-http` layer answering preflights and decorating simple requests.
    #[must_use]
    pub fn layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list([self.origin.clone()]))
            .allow_methods(ALLOWED_METHODS.to_vec())
            .allow_headers(self.headers.clone())
            .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
            .allow_credentials(true)
            .max_age(PREFLIGHT_MAX_AGE)
    }

    /// Checks a preflight's origin, method and requested headers against the policy.
    ///
    /// # Errors
    /// Returns the first reason the preflight falls outside the policy.
    pub fn check_preflight(&self, headers: &HeaderMap) -> Result<(), &'static str> {
        if headers.get(ORIGIN) != Some(&self.origin) {
            return Err("origin not allowed");
        }

        let method = headers
            .get(ACCESS_CONTROL_REQUEST_METHOD)
            .and_then(|v| Method::from_bytes(v.as_bytes()).ok())
            .ok_or("malformed request method")?;
        if !ALLOWED_METHODS.contains(&method) {
            return Err("method not allowed");
        }

        for value in headers.get_all(ACCESS_CONTROL_REQUEST_HEADERS) {
            let list = value.to_str().map_err(|_| "malformed request headers")?;
            for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                let name = HeaderName::try_from(name).map_err(|_| "malformed request headers")?;
                if !self.headers.contains(&name) {
                    return Err("header not allowed");
                }
            }
        }

        Ok(())
    }
}

/// Rejects preflights that fall outside [`CorsPolicy`] with a 403 before they reach the
/// CORS layer or any handler.
pub async fn preflight_guard(
    State(policy): State<Arc<CorsPolicy>>,
    req: Request,
    next: Next,
) -> Response {
    let is_preflight = req.method() == Method::OPTIONS
        && req.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD);

    if is_preflight && let Err(reason) = policy.check_preflight(req.headers()) {
        debug!(reason, origin = ?req.headers().get(ORIGIN), "CORS preflight rejected");
        return ApiError::Forbidden { message: "CORS preflight rejected".into() }.into_response();
    }

    next.run(req).await
}
