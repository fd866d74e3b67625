//! Facade over the route modules.
//! Re-exports domain/kernel primitives and lists every module the gateway mounts.
//! Keep this crate thin: it composes other crates and implements no handlers.

pub use sgate_domain as domain;
pub use sgate_kernel as kernel;

use sgate_domain::constants::{
    ANALYTICS_PREFIX, BLOGS_PREFIX, FILTERS_PREFIX, SEARCH_PREFIX, STATUS_PREFIX,
    WEBHOOK_PREFIX,
};
use sgate_kernel::server::Mount;

pub mod server {
    pub mod router {
        pub use sgate_kernel::server::router::system_router;
    }
}

/// Route modules compiled into the gateway.
pub mod features {
    pub use sgate_analytics as analytics;
    pub use sgate_blogs as blogs;
    pub use sgate_filters as filters;
    pub use sgate_search as search;
    pub use sgate_status as status;
    pub use sgate_webhooks as webhooks;
}

/// Every route module with the prefix it is mounted under.
#[must_use]
pub fn modules() -> Vec<Mount> {
    vec![
        Mount::new(SEARCH_PREFIX, features::search::router()),
        Mount::new(FILTERS_PREFIX, features::filters::router()),
        Mount::new(ANALYTICS_PREFIX, features::analytics::router()),
        Mount::new(WEBHOOK_PREFIX, features::webhooks::router()),
        Mount::new(BLOGS_PREFIX, features::blogs::router()),
        Mount::new(STATUS_PREFIX, features::status::router()),
    ]
}
