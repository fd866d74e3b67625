//! Cross-cutting request/response stages. The gateway composes them in a fixed order.

mod access_log;
mod cors;
mod envelope;
mod request_log;
mod security;

pub use self::access_log::{AccessLogFormat, access_log};
pub use self::cors::{ALLOWED_METHODS, CorsError, CorsPolicy, preflight_guard};
pub use self::envelope::{ErrorEnvelope, error_envelope, panic_response};
pub use self::request_log::{RequestId, request_logger};
pub use self::security::{DOCS_PATH, security_headers};
