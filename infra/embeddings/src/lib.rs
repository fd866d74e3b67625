//! # Embeddings
//!
//! Turns text into vectors. [`Embedder`] is the seam the gateway depends on;
//! [`OpenAiEmbedder`] talks to any OpenAI-compatible `/embeddings` endpoint.
//!
//! ```rust,no_run
//! use sgate_domain::config::{OpenAiConfig, Secret};
//! use sgate_embeddings::{Embedder, OpenAiEmbedder};
//!
//! # async fn demo() -> Result<(), sgate_embeddings::EmbeddingError> {
//! let cfg = OpenAiConfig { api_key: Secret::new("sk-..."), ..OpenAiConfig::default() };
//! let embedder = OpenAiEmbedder::new(&cfg)?;
//! let vector = embedder.generate_embedding("how do refunds work?").await?;
//! assert!(!vector.is_empty());
//! # Ok(())
//! # }
//! ```

mod error;
mod openai;

pub use crate::error::{EmbeddingError, EmbeddingErrorExt};
pub use crate::openai::OpenAiEmbedder;

use async_trait::async_trait;
use std::fmt::Debug;

/// Something that can embed text. Implementations must be cheap to share (`Arc`).
#[async_trait]
pub trait Embedder: Debug + Send + Sync {
    /// Model identifier reported in diagnostics.
    fn model(&self) -> &str;

    /// Embeds `text` into a single vector.
    ///
    /// # Errors
    /// Fails on empty input, transport errors, timeouts and non-success responses.
    /// Errors never carry the provider's response body.
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}
