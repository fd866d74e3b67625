//! Facet values (content types and locales) the search UI can filter on.

use axum::Json;
use axum::extract::State;
use sgate_derive::{api_handler, api_model};
use sgate_domain::constants::CONTENT_TAG;
use sgate_domain::models::FilterOptions;
use sgate_kernel::server::{ApiError, ApiState, ErrorBody};
use tracing::debug;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[api_model]
pub struct FiltersResponse {
    /// Distinct content types, sorted
    pub content_types: Vec<String>,
    /// Distinct locales, sorted
    pub locales: Vec<String>,
}

impl From<FilterOptions> for FiltersResponse {
    fn from(options: FilterOptions) -> Self {
        Self { content_types: options.content_types, locales: options.locales }
    }
}

#[api_handler(
    get,
    path = "/",
    responses(
        (status = OK, description = "Available filter values", body = FiltersResponse),
        (status = BAD_GATEWAY, description = "Store failed", body = ErrorBody),
    ),
    tag = CONTENT_TAG,
)]
pub(crate) async fn list_filters(
    State(state): State<ApiState>,
) -> Result<Json<FiltersResponse>, ApiError> {
    let options = state.store.filter_options().await?;
    debug!(
        content_types = options.content_types.len(),
        locales = options.locales.len(),
        "Filter options loaded"
    );
    Ok(Json(options.into()))
}

/// Routes of the filters module, mounted under `/api/filters`.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(list_filters))
}
