use super::state::ApiState;
use super::{diagnostics, health};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Gateway-owned routes: welcome, liveness, favicon and the `/api/test*` checks.
pub fn system_router() -> OpenApiRouter<ApiState> {
    health::start_clock();

    OpenApiRouter::new()
        .routes(routes!(diagnostics::welcome))
        .routes(routes!(health::health_handler))
        .routes(routes!(diagnostics::favicon))
        .routes(routes!(diagnostics::echo_get, diagnostics::echo_post))
        .routes(routes!(diagnostics::test_openai))
        .routes(routes!(diagnostics::test_supabase))
        .routes(routes!(diagnostics::test_services))
}
