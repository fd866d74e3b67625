//! HTTP plumbing shared by the gateway and its route modules.

pub mod connectivity;
mod diagnostics;
mod error;
mod extract;
mod fallback;
mod health;
pub mod middleware;
mod module;
pub mod router;
mod state;

pub use self::error::{ApiError, ErrorBody, ErrorReport};
pub use self::extract::Payload;
pub use self::fallback::not_found;
pub use self::module::Mount;
pub use self::state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};

use chrono::{SecondsFormat, Utc};

/// Current UTC time as RFC 3339 with millisecond precision (`2026-01-01T00:00:00.000Z`).
#[must_use]
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
