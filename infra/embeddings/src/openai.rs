use crate::error::{EmbeddingError, EmbeddingErrorExt};
use crate::Embedder;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sgate_domain::config::{OpenAiConfig, Secret};
use std::time::Duration;
use tracing::{debug, instrument};

/// Longest slice of a provider error body we are willing to log.
const LOGGED_BODY_CHARS: usize = 512;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'static str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Client for `POST {base_url}/embeddings`.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    api_key: Secret,
    endpoint: String,
    model: String,
    timeout_secs: u64,
    max_input_chars: usize,
}

impl OpenAiEmbedder {
    /// Builds the client from configuration.
    ///
    /// # Errors
    /// [`EmbeddingError::Config`] when the API key or base URL is missing,
    /// [`EmbeddingError::Request`] when the HTTP client cannot be constructed.
    pub fn new(config: &OpenAiConfig) -> Result<Self, EmbeddingError> {
        if config.api_key.is_empty() {
            return Err(EmbeddingError::Config {
                message: "OpenAI API key is not set".into(),
                context: Some("services.openai.api_key".into()),
            });
        }
        let base = config.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(EmbeddingError::Config {
                message: "OpenAI base URL is empty".into(),
                context: Some("services.openai.base_url".into()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building embeddings HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!("{base}/embeddings"),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs.max(1),
            max_input_chars: config.max_input_chars.max(1),
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> EmbeddingError {
        if err.is_timeout() {
            EmbeddingError::Timeout { after_secs: self.timeout_secs, context: None }
        } else {
            EmbeddingError::Request { source: err.without_url(), context: None }
        }
    }
}

/// Trims `text` and cuts it to at most `max_chars` characters on a char boundary.
pub(crate) fn prepare_input(text: &str, max_chars: usize) -> &str {
    let text = text.trim();
    text.char_indices().nth(max_chars).map_or(text, |(idx, _)| &text[..idx])
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = prepare_input(text, self.max_input_chars);
        if input.is_empty() {
            return Err(EmbeddingError::InvalidInput {
                message: "text to embed is empty".into(),
                context: None,
            });
        }

        let request = EmbeddingRequest { model: &self.model, input, encoding_format: "float" };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(LOGGED_BODY_CHARS).collect();
            debug!(status = status.as_u16(), body = %snippet, "Embedding provider rejected request");
            return Err(EmbeddingError::Status { status: status.as_u16(), context: None });
        }

        let payload: EmbeddingResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                EmbeddingError::Timeout { after_secs: self.timeout_secs, context: None }
            } else {
                EmbeddingError::Decode { message: e.without_url().to_string().into(), context: None }
            }
        })?;

        let vector = payload.data.into_iter().next().map(|d| d.embedding).unwrap_or_default();
        if vector.is_empty() {
            return Err(EmbeddingError::EmptyResponse { context: None });
        }

        debug!(dimensions = vector.len(), "Embedding generated");
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_trimmed_and_truncated_on_char_boundary() {
        assert_eq!(prepare_input("  hello  ", 10), "hello");
        assert_eq!(prepare_input("héllo wörld", 4), "héll");
        assert_eq!(prepare_input("   ", 10), "");
    }

    #[test]
    fn new_requires_api_key() {
        let err = OpenAiEmbedder::new(&OpenAiConfig::default()).expect_err("missing key");
        assert!(matches!(err, EmbeddingError::Config { .. }));
        assert!(!err.is_upstream());
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let cfg = OpenAiConfig {
            api_key: Secret::new("sk-test"),
            base_url: "http://localhost:9999/v1/".to_owned(),
            ..OpenAiConfig::default()
        };
        let embedder = OpenAiEmbedder::new(&cfg).expect("client");
        assert_eq!(embedder.endpoint, "http://localhost:9999/v1/embeddings");
        assert_eq!(embedder.model(), "text-embedding-3-small");
    }
}
