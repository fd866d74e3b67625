//! Semantic search: embed the query, then ask the store for the nearest documents.

use axum::Json;
use axum::extract::State;
use sgate_derive::{api_handler, api_model};
use sgate_domain::constants::CONTENT_TAG;
use sgate_domain::models::{SearchFilters, SearchHit};
use sgate_kernel::server::{ApiError, ApiState, ErrorBody, Payload};
use std::time::Instant;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const MAX_QUERY_CHARS: usize = 1000;
pub const MAX_LIMIT: usize = 50;

#[api_model]
/// Search request
pub struct SearchRequest {
    /// Free-text query
    pub query: String,
    #[serde(default)]
    pub content_types: Option<Vec<String>>,
    #[serde(default)]
    pub locales: Option<Vec<String>>,
    /// 1..=50, default 10
    #[serde(default)]
    pub limit: Option<usize>,
    /// Minimum similarity in 0..=1, default 0.5
    #[serde(default)]
    pub threshold: Option<f32>,
}

#[api_model]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub content_type: String,
    pub locale: String,
    pub excerpt: Option<String>,
    pub similarity: f32,
}

impl From<SearchHit> for SearchResult {
    fn from(hit: SearchHit) -> Self {
        Self {
            id: hit.id,
            title: hit.title,
            url: hit.url,
            content_type: hit.content_type,
            locale: hit.locale,
            excerpt: hit.excerpt,
            similarity: hit.similarity,
        }
    }
}

#[api_model]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub count: usize,
    pub took_ms: u64,
}

fn clean_list(values: Option<Vec<String>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect()
}

impl SearchRequest {
    /// Splits the request into the trimmed query and validated store filters.
    fn into_parts(self) -> Result<(String, SearchFilters), ApiError> {
        let query = self.query.trim().to_owned();
        if query.is_empty() {
            return Err(ApiError::bad_request("query must not be empty"));
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(ApiError::bad_request(format!(
                "query must be at most {MAX_QUERY_CHARS} characters"
            )));
        }

        let defaults = SearchFilters::default();
        let limit = self.limit.unwrap_or(defaults.limit);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ApiError::bad_request(format!("limit must be between 1 and {MAX_LIMIT}")));
        }
        let threshold = self.threshold.unwrap_or(defaults.threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ApiError::bad_request("threshold must be between 0 and 1"));
        }

        let filters = SearchFilters {
            content_types: clean_list(self.content_types),
            locales: clean_list(self.locales),
            limit,
            threshold,
        };
        Ok((query, filters))
    }
}

#[api_handler(
    post,
    path = "/",
    request_body = SearchRequest,
    responses(
        (status = OK, description = "Ranked results", body = SearchResponse),
        (status = BAD_REQUEST, description = "Invalid query or filters", body = ErrorBody),
        (status = BAD_GATEWAY, description = "Embedding provider or store failed", body = ErrorBody),
        (status = GATEWAY_TIMEOUT, description = "A downstream service timed out", body = ErrorBody),
    ),
    tag = CONTENT_TAG,
)]
pub(crate) async fn search(
    State(state): State<ApiState>,
    Payload(request): Payload<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let started = Instant::now();
    let (query, filters) = request.into_parts()?;

    let embedding = state.embedder.generate_embedding(&query).await?;
    let hits = state.store.search(&embedding, &filters).await?;

    let took_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(results = hits.len(), took_ms, limit = filters.limit, "Search served");

    let results: Vec<SearchResult> = hits.into_iter().map(SearchResult::from).collect();
    Ok(Json(SearchResponse { query, count: results.len(), results, took_ms }))
}

/// Routes of the search module, mounted under `/api/search`.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(search))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: &str) -> SearchRequest {
        SearchRequest { query: query.to_owned(), content_types: None, locales: None, limit: None, threshold: None }
    }

    #[test]
    fn defaults_apply() {
        let (query, filters) = request("  refunds ").into_parts().expect("valid");
        assert_eq!(query, "refunds");
        assert_eq!(filters, SearchFilters::default());
    }

    #[test]
    fn blank_filter_values_are_dropped() {
        let req = SearchRequest {
            content_types: Some(vec![" page ".into(), String::new()]),
            ..request("q")
        };
        let (_, filters) = req.into_parts().expect("valid");
        assert_eq!(filters.content_types, vec!["page"]);
    }

    #[test]
    fn bounds_are_enforced() {
        assert!(request("   ").into_parts().is_err());
        assert!(request(&"x".repeat(MAX_QUERY_CHARS + 1)).into_parts().is_err());
        assert!(SearchRequest { limit: Some(0), ..request("q") }.into_parts().is_err());
        assert!(SearchRequest { limit: Some(51), ..request("q") }.into_parts().is_err());
        assert!(SearchRequest { threshold: Some(1.5), ..request("q") }.into_parts().is_err());
        assert!(SearchRequest { limit: Some(50), threshold: Some(0.0), ..request("q") }.into_parts().is_ok());
    }
}
