use axum::body::HttpBody;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::{CONTENT_LENGTH, REFERER, USER_AGENT};
use axum::http::{HeaderMap, Method, StatusCode, Uri, Version};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use sgate_domain::config::Environment;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::info;

/// Shape of the one-line access log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLogFormat {
    /// `GET /api/search 200 12.345 ms - 512`
    Dev,
    /// Apache combined log format.
    Combined,
}

impl AccessLogFormat {
    #[must_use]
    pub const fn for_environment(env: Environment) -> Self {
        if env.is_development() { Self::Dev } else { Self::Combined }
    }
}

struct AccessEntry<'a> {
    remote: Option<SocketAddr>,
    at: DateTime<Utc>,
    method: &'a Method,
    uri: &'a Uri,
    version: Version,
    status: StatusCode,
    length: Option<&'a str>,
    referer: Option<&'a str>,
    user_agent: Option<&'a str>,
    elapsed: Duration,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &axum::http::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn format_line(format: AccessLogFormat, entry: &AccessEntry<'_>) -> String {
    let length = entry.length.unwrap_or("-");
    match format {
        AccessLogFormat::Dev => format!(
            "{} {} {} {:.3} ms - {length}",
            entry.method,
            entry.uri,
            entry.status.as_u16(),
            entry.elapsed.as_secs_f64() * 1000.0,
        ),
        AccessLogFormat::Combined => format!(
            "{} - - [{}] \"{} {} {:?}\" {} {length} \"{}\" \"{}\"",
            entry.remote.map_or_else(|| "-".to_owned(), |a| a.ip().to_string()),
            entry.at.format("%d/%b/%Y:%H:%M:%S %z"),
            entry.method,
            entry.uri,
            entry.version,
            entry.status.as_u16(),
            entry.referer.unwrap_or("-"),
            entry.user_agent.unwrap_or("-"),
        ),
    }
}

/// Writes one line per request on the `sgate::access` target.
pub async fn access_log(
    State(format): State<AccessLogFormat>,
    req: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let at = Utc::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();
    let remote = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|c| c.0);
    let referer = header_str(req.headers(), &REFERER).map(ToOwned::to_owned);
    let user_agent = header_str(req.headers(), &USER_AGENT).map(ToOwned::to_owned);

    let response = next.run(req).await;
    let body_len = response.body().size_hint().exact().map(|n| n.to_string());

    let entry = AccessEntry {
        remote,
        at,
        method: &method,
        uri: &uri,
        version,
        status: response.status(),
        length: header_str(response.headers(), &CONTENT_LENGTH).or(body_len.as_deref()),
        referer: referer.as_deref(),
        user_agent: user_agent.as_deref(),
        elapsed: started.elapsed(),
    };
    info!(target: "sgate::access", "{}", format_line(format, &entry));

    response
}
