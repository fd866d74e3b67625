use sgate_domain::config::{ApiConfig, Environment};
use sgate_embeddings::Embedder;
use sgate_store::Store;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[sgate_derive::sgate_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Everything a handler may need, built once at startup.
#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn Store>,
}

#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.inner.config.environment
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    store: Option<Arc<dyn Store>>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;
        let embedder = self.embedder.ok_or_else(|| ApiStateError::Validation {
            message: "Embedding client not provided".into(),
            context: None,
        })?;
        let store = self.store.ok_or_else(|| ApiStateError::Validation {
            message: "Store client not provided".into(),
            context: None,
        })?;

        Ok(ApiState { inner: Arc::new(ApiStateInner { config, embedder, store }) })
    }
}
