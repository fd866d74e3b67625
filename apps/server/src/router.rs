use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::middleware::{from_fn, from_fn_with_state};
use sgate::kernel::server::middleware::{
    AccessLogFormat, CorsPolicy, DOCS_PATH, ErrorEnvelope, access_log, error_envelope,
    panic_response, preflight_guard, request_logger, security_headers,
};
use sgate::kernel::server::{ApiState, not_found};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "sgate", description = "Content search API gateway"))]
struct ApiDoc;

/// Composes routes, docs and static assets, then wraps them in the middleware stack.
///
/// Layers run outermost first: security headers, compression, preflight guard, CORS,
/// access log, request id, error envelope, body limits, panic catcher.
#[allow(unreachable_pub)]
pub fn init(state: ApiState, cors: Arc<CorsPolicy>) -> Router {
    let env = state.environment();
    let limit = state.config.http.max_body_bytes;
    let static_dir = state.config.http.static_dir.clone();

    let api = sgate::modules().into_iter().fold(
        OpenApiRouter::with_openapi(ApiDoc::openapi())
            .merge(sgate::server::router::system_router()),
        |api, module| api.nest(module.prefix, module.router),
    );
    let (api_routes, api_doc) = api.split_for_parts();

    let assets = ServeDir::new(static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .merge(api_routes)
        .merge(Scalar::with_url(DOCS_PATH, api_doc))
        .fallback_service(assets)
        .method_not_allowed_fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(DefaultBodyLimit::max(limit))
        .layer(RequestBodyLimitLayer::new(limit))
        .layer(from_fn_with_state(ErrorEnvelope::new(env), error_envelope))
        .layer(from_fn(request_logger))
        .layer(from_fn_with_state(AccessLogFormat::for_environment(env), access_log))
        .layer(TraceLayer::new_for_http())
        .layer(cors.layer())
        .layer(from_fn_with_state(cors, preflight_guard))
        .layer(CompressionLayer::new())
        .layer(from_fn(security_headers))
        .with_state(state)
}
