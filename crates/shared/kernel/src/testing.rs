//! In-memory doubles for the downstream services. Enabled with the `testing` feature.
//!
//! Both doubles count calls and can be switched into a failing mode at any time.

use async_trait::async_trait;
use sgate_domain::models::{
    AnalyticsRecord, BlogPost, BlogQuery, ContentDocument, FilterOptions, SearchFilters,
    SearchHit,
};
use sgate_embeddings::{Embedder, EmbeddingError};
use sgate_store::{Store, StoreError};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Error text the doubles fail with; tests assert it does or does not leak.
pub const STUB_FAILURE: &str = "stub downstream exploded: secret-token-123";

#[derive(Debug)]
pub struct StubEmbedder {
    dimensions: usize,
    failing: AtomicBool,
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl StubEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        let stub = Self::new(1536);
        stub.set_failing(true);
        stub
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts passed to [`Embedder::generate_embedding`], in call order.
    #[must_use]
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self::new(1536)
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    fn model(&self) -> &str {
        "stub-embedding"
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut inputs) = self.inputs.lock() {
            inputs.push(text.to_owned());
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbeddingError::Decode { message: STUB_FAILURE.into(), context: None });
        }
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput {
                message: "text to embed is empty".into(),
                context: None,
            });
        }
        Ok(vec![0.1; self.dimensions])
    }
}

/// Canned store contents plus a log of writes.
#[derive(Debug, Default)]
pub struct StubStore {
    pub options: FilterOptions,
    pub hits: Vec<SearchHit>,
    pub blogs: Vec<BlogPost>,
    failing: AtomicBool,
    calls: AtomicUsize,
    upserts: Mutex<Vec<(ContentDocument, usize)>>,
    deletes: Mutex<Vec<String>>,
    events: Mutex<Vec<AnalyticsRecord>>,
    searches: Mutex<Vec<SearchFilters>>,
}

impl StubStore {
    /// A store holding two content types and two locales.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            options: FilterOptions {
                content_types: vec!["blog".into(), "page".into()],
                locales: vec!["en".into(), "fr".into()],
            },
            hits: vec![
                SearchHit {
                    id: "doc-1".into(),
                    title: "Refund policy".into(),
                    url: Some("/refunds".into()),
                    content_type: "page".into(),
                    locale: "en".into(),
                    excerpt: Some("How refunds work".into()),
                    similarity: 0.92,
                },
                SearchHit {
                    id: "doc-2".into(),
                    title: "Shipping".into(),
                    url: None,
                    content_type: "page".into(),
                    locale: "en".into(),
                    excerpt: None,
                    similarity: 0.71,
                },
            ],
            blogs: vec![
                BlogPost {
                    id: "b1".into(),
                    slug: "hello-world".into(),
                    title: "Hello world".into(),
                    locale: "en".into(),
                    excerpt: None,
                    author: Some("Team".into()),
                    cover_image: None,
                    published_at: Some("2026-01-02T00:00:00Z".into()),
                },
                BlogPost {
                    id: "b2".into(),
                    slug: "bonjour".into(),
                    title: "Bonjour".into(),
                    locale: "fr".into(),
                    excerpt: None,
                    author: None,
                    cover_image: None,
                    published_at: Some("2026-01-01T00:00:00Z".into()),
                },
            ],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        let stub = Self::default();
        stub.set_failing(true);
        stub
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Upserted documents with the length of the vector stored alongside.
    #[must_use]
    pub fn upserts(&self) -> Vec<(ContentDocument, usize)> {
        self.upserts.lock().map(|v| v.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().map(|v| v.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<AnalyticsRecord> {
        self.events.lock().map(|v| v.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn searches(&self) -> Vec<SearchFilters> {
        self.searches.lock().map(|v| v.clone()).unwrap_or_default()
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Decode { message: STUB_FAILURE.into(), context: None });
        }
        Ok(())
    }
}

fn push_log<T>(log: &Mutex<Vec<T>>, value: T) {
    if let Ok(mut entries) = log.lock() {
        entries.push(value);
    }
}

#[async_trait]
impl Store for StubStore {
    async fn filter_options(&self) -> Result<FilterOptions, StoreError> {
        self.enter()?;
        Ok(self.options.clone())
    }

    async fn search(
        &self,
        _embedding: &[f32],
        filters: &SearchFilters,
    ) -> Result<Vec<SearchHit>, StoreError> {
        self.enter()?;
        push_log(&self.searches, filters.clone());
        Ok(self
            .hits
            .iter()
            .filter(|h| h.similarity >= filters.threshold)
            .filter(|h| {
                filters.content_types.is_empty() || filters.content_types.contains(&h.content_type)
            })
            .filter(|h| filters.locales.is_empty() || filters.locales.contains(&h.locale))
            .take(filters.limit)
            .cloned()
            .collect())
    }

    async fn list_blogs(&self, query: &BlogQuery) -> Result<Vec<BlogPost>, StoreError> {
        self.enter()?;
        Ok(self
            .blogs
            .iter()
            .filter(|b| query.locale.as_ref().is_none_or(|l| &b.locale == l))
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn get_blog(&self, slug: &str) -> Result<Option<BlogPost>, StoreError> {
        self.enter()?;
        Ok(self.blogs.iter().find(|b| b.slug == slug).cloned())
    }

    async fn upsert_document(
        &self,
        document: &ContentDocument,
        embedding: &[f32],
    ) -> Result<(), StoreError> {
        self.enter()?;
        push_log(&self.upserts, (document.clone(), embedding.len()));
        Ok(())
    }

    async fn delete_document(&self, id: &str) -> Result<(), StoreError> {
        self.enter()?;
        push_log(&self.deletes, id.to_owned());
        Ok(())
    }

    async fn record_event(&self, record: &AnalyticsRecord) -> Result<(), StoreError> {
        self.enter()?;
        push_log(&self.events, record.clone());
        Ok(())
    }
}

/// Application state over the given doubles.
///
/// # Errors
/// Never in practice; mirrors [`crate::server::ApiStateBuilder::build`].
pub fn stub_state(
    config: sgate_domain::config::ApiConfig,
    embedder: std::sync::Arc<StubEmbedder>,
    store: std::sync::Arc<StubStore>,
) -> Result<crate::server::ApiState, crate::server::ApiStateError> {
    crate::server::ApiState::builder().config(config).embedder(embedder).store(store).build()
}
