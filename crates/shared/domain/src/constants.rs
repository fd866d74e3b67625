//! Route prefixes and limits shared by the gateway and its route modules.

/// Upper bound for JSON and URL-encoded request bodies (10 MiB).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub const SEARCH_PREFIX: &str = "/api/search";
pub const FILTERS_PREFIX: &str = "/api/filters";
pub const ANALYTICS_PREFIX: &str = "/api/analytics";
pub const WEBHOOK_PREFIX: &str = "/api/webhook";
pub const BLOGS_PREFIX: &str = "/api/blogs";
pub const STATUS_PREFIX: &str = "/api/health";

/// `OpenAPI` tags.
pub const SYSTEM_TAG: &str = "System";
pub const DIAGNOSTICS_TAG: &str = "Diagnostics";
pub const CONTENT_TAG: &str = "Content";

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Header carrying the webhook shared secret.
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";
