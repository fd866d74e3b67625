//! Published blog posts, newest first.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use sgate_derive::{api_handler, api_model};
use sgate_domain::constants::CONTENT_TAG;
use sgate_domain::models::{BlogPost, BlogQuery};
use sgate_kernel::server::{ApiError, ApiState, ErrorBody};
use tracing::debug;
use utoipa::IntoParams;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const MAX_PAGE_SIZE: usize = 100;

#[api_model]
#[derive(Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlogListParams {
    /// Only posts in this locale
    pub locale: Option<String>,
    /// Page size, 1..=100, default 20
    pub limit: Option<usize>,
    /// Posts to skip, default 0
    pub offset: Option<usize>,
}

impl TryFrom<BlogListParams> for BlogQuery {
    type Error = ApiError;

    fn try_from(params: BlogListParams) -> Result<Self, ApiError> {
        let defaults = Self::default();
        let limit = params.limit.unwrap_or(defaults.limit);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(ApiError::bad_request(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self {
            locale: params.locale.map(|l| l.trim().to_owned()).filter(|l| !l.is_empty()),
            limit,
            offset: params.offset.unwrap_or(defaults.offset),
        })
    }
}

#[api_model]
#[derive(Clone)]
pub struct BlogPostDto {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub locale: String,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub cover_image: Option<String>,
    /// RFC 3339 publication time
    pub published_at: Option<String>,
}

impl From<BlogPost> for BlogPostDto {
    fn from(post: BlogPost) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            locale: post.locale,
            excerpt: post.excerpt,
            author: post.author,
            cover_image: post.cover_image,
            published_at: post.published_at,
        }
    }
}

#[api_model]
pub struct BlogListResponse {
    pub posts: Vec<BlogPostDto>,
    pub count: usize,
}

#[api_handler(
    get,
    path = "/",
    params(BlogListParams),
    responses(
        (status = OK, description = "A page of posts", body = BlogListResponse),
        (status = BAD_REQUEST, description = "Invalid paging", body = ErrorBody),
        (status = BAD_GATEWAY, description = "Store failed", body = ErrorBody),
    ),
    tag = CONTENT_TAG,
)]
pub(crate) async fn list_blogs(
    State(state): State<ApiState>,
    params: Result<Query<BlogListParams>, QueryRejection>,
) -> Result<Json<BlogListResponse>, ApiError> {
    let Query(params) = params?;
    let query = BlogQuery::try_from(params)?;

    let posts: Vec<BlogPostDto> =
        state.store.list_blogs(&query).await?.into_iter().map(BlogPostDto::from).collect();
    debug!(count = posts.len(), offset = query.offset, "Blog page served");

    Ok(Json(BlogListResponse { count: posts.len(), posts }))
}

#[api_handler(
    get,
    path = "/{slug}",
    params(("slug" = String, Path, description = "URL slug of the post")),
    responses(
        (status = OK, description = "The post", body = BlogPostDto),
        (status = NOT_FOUND, description = "No post with that slug", body = ErrorBody),
        (status = BAD_GATEWAY, description = "Store failed", body = ErrorBody),
    ),
    tag = CONTENT_TAG,
)]
pub(crate) async fn get_blog(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPostDto>, ApiError> {
    state
        .store
        .get_blog(&slug)
        .await?
        .map(|post| Json(post.into()))
        .ok_or_else(|| ApiError::not_found(format!("Blog post {slug} not found")))
}

/// Routes of the blogs module, mounted under `/api/blogs`.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(list_blogs)).routes(routes!(get_blog))
}
