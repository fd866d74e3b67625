use super::error::ApiError;
use axum::http::Uri;

/// Catch-all for unknown paths and for known paths hit with an unsupported method.
///
/// The message names the path verbatim, without the query string.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route {} not found", uri.path()))
}
