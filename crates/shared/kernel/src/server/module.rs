use super::state::ApiState;
use std::fmt;
use utoipa_axum::router::OpenApiRouter;

/// A route module nested under a fixed path prefix.
pub struct Mount {
    pub prefix: &'static str,
    pub router: OpenApiRouter<ApiState>,
}

impl Mount {
    #[must_use]
    pub const fn new(prefix: &'static str, router: OpenApiRouter<ApiState>) -> Self {
        Self { prefix, router }
    }
}

impl fmt::Debug for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mount").field("prefix", &self.prefix).finish_non_exhaustive()
    }
}
