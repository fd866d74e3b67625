use super::error::ApiError;
use axum::body::{Body, Bytes};
use axum::extract::rejection::{
    BytesRejection, FormRejection, JsonRejection, PathRejection, QueryRejection,
};
use axum::extract::{FromRequest, OptionalFromRequest, Request};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::de::DeserializeOwned;

/// A request body sent either as JSON or as `application/x-www-form-urlencoded`.
///
/// Any other content type is rejected with 415, malformed bodies with 400 and bodies
/// over the configured limit with 413. As `Option<Payload<T>>` a request without a
/// `Content-Type` or with an empty body yields `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
}

fn body_kind(req: &Request) -> Option<Result<BodyKind, ApiError>> {
    let header = req.headers().get(CONTENT_TYPE)?;
    let mime = header
        .to_str()
        .unwrap_or_default()
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    Some(match mime.as_str() {
        "application/json" => Ok(BodyKind::Json),
        "application/x-www-form-urlencoded" => Ok(BodyKind::Form),
        m if m.starts_with("application/") && m.ends_with("+json") => Ok(BodyKind::Json),
        _ => Err(unsupported()),
    })
}

fn unsupported() -> ApiError {
    ApiError::UnsupportedMediaType {
        message: "Expected an application/json or application/x-www-form-urlencoded body".into(),
    }
}

async fn parse<S, T>(kind: BodyKind, req: Request, state: &S) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    match kind {
        BodyKind::Json => Ok(<Json<T> as FromRequest<S>>::from_request(req, state).await?.0),
        BodyKind::Form => Ok(<Form<T> as FromRequest<S>>::from_request(req, state).await?.0),
    }
}

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let kind = body_kind(&req).unwrap_or_else(|| Err(unsupported()))?;
        parse(kind, req, state).await.map(Payload)
    }
}

impl<S, T> OptionalFromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let Some(kind) = body_kind(&req) else {
            return Ok(None);
        };
        let kind = kind?;

        let (parts, body) = req.into_parts();
        let bytes =
            <Bytes as FromRequest<S>>::from_request(Request::from_parts(parts.clone(), body), state)
                .await?;
        if bytes.is_empty() {
            return Ok(None);
        }

        let req = Request::from_parts(parts, Body::from(bytes));
        parse(kind, req, state).await.map(|v| Some(Payload(v)))
    }
}

fn from_rejection(status: StatusCode, text: String) -> ApiError {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => {
            ApiError::PayloadTooLarge { message: "Request body is too large".into() }
        }
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ApiError::UnsupportedMediaType { message: text.into() },
        s if s.is_server_error() => ApiError::internal(text),
        _ => ApiError::bad_request(text),
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        from_rejection(rejection.status(), rejection.body_text())
    }
}
