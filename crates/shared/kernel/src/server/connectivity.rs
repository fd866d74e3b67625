//! Connectivity checks for the two downstream services.
//!
//! Used by the `/api/test-*` endpoints and by the readiness route. A check never fails:
//! it always resolves to a [`CheckOutcome`].

use sgate_derive::api_model;
use sgate_domain::config::Environment;
use sgate_embeddings::Embedder;
use sgate_store::Store;
use std::time::Instant;
use tracing::warn;

/// Fixed input sent to the embedding provider by the check.
pub const CHECK_TEXT: &str = "test embedding";

#[api_model(rename_all = "snake_case")]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Success,
    Error,
}

#[api_model]
#[derive(Clone)]
pub struct CheckOutcome {
    pub status: CheckStatus,
    pub message: String,
    /// Dimensions of the returned vector (embedding check only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_length: Option<usize>,
    /// Number of distinct content types (store check only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_types: Option<usize>,
    /// Number of distinct locales (store check only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locales: Option<usize>,
    pub latency_ms: u64,
}

impl CheckOutcome {
    fn success(message: &str, started: Instant) -> Self {
        Self {
            status: CheckStatus::Success,
            message: message.to_owned(),
            embedding_length: None,
            content_types: None,
            locales: None,
            latency_ms: elapsed_ms(started),
        }
    }

    fn failure(message: String, started: Instant) -> Self {
        Self {
            status: CheckStatus::Error,
            message,
            embedding_length: None,
            content_types: None,
            locales: None,
            latency_ms: elapsed_ms(started),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == CheckStatus::Success
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Embeds [`CHECK_TEXT`] and reports the vector length.
///
/// Outside development the failure message is generic; the real error is logged.
pub async fn check_embeddings(embedder: &dyn Embedder, env: Environment) -> CheckOutcome {
    let started = Instant::now();
    match embedder.generate_embedding(CHECK_TEXT).await {
        Ok(vector) => CheckOutcome {
            embedding_length: Some(vector.len()),
            ..CheckOutcome::success("Embedding service connection successful", started)
        },
        Err(err) => {
            warn!(model = embedder.model(), error = %err, "Embedding check failed");
            let message = if env.is_development() {
                err.to_string()
            } else {
                "Embedding service check failed".to_owned()
            };
            CheckOutcome::failure(message, started)
        }
    }
}

/// Queries filter options and reports how many content types and locales exist.
pub async fn check_store(store: &dyn Store, env: Environment) -> CheckOutcome {
    let started = Instant::now();
    match store.filter_options().await {
        Ok(options) => CheckOutcome {
            content_types: Some(options.content_types.len()),
            locales: Some(options.locales.len()),
            ..CheckOutcome::success("Store connection successful", started)
        },
        Err(err) => {
            warn!(error = %err, "Store check failed");
            let message = if env.is_development() {
                err.to_string()
            } else {
                "Store check failed".to_owned()
            };
            CheckOutcome::failure(message, started)
        }
    }
}
