use crate::error::{StoreError, StoreErrorExt};
use crate::Store;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sgate_domain::config::{Secret, SupabaseConfig};
use sgate_domain::models::{
    AnalyticsRecord, BlogPost, BlogQuery, ContentDocument, FilterOptions, SearchFilters,
    SearchHit,
};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, instrument};

const LOGGED_BODY_CHARS: usize = 512;
const BLOG_COLUMNS: &str = "id,slug,title,locale,excerpt,author,cover_image,published_at";

#[derive(Deserialize)]
struct FacetRow {
    content_type: Option<String>,
    locale: Option<String>,
}

#[derive(Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_threshold: f32,
    match_count: usize,
    filter_content_types: Option<&'a [String]>,
    filter_locales: Option<&'a [String]>,
}

#[derive(Serialize)]
struct DocumentRow<'a> {
    id: &'a str,
    title: &'a str,
    content: &'a str,
    url: Option<&'a str>,
    content_type: &'a str,
    locale: &'a str,
    updated_at: Option<&'a str>,
    embedding: &'a [f32],
}

/// PostgREST client for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    rest_url: String,
    service_key: Secret,
    timeout_secs: u64,
    documents_table: String,
    blogs_table: String,
    analytics_table: String,
    match_function: String,
}

impl SupabaseStore {
    /// Builds the client from configuration.
    ///
    /// # Errors
    /// [`StoreError::Config`] when the project URL or service key is missing,
    /// [`StoreError::Request`] when the HTTP client cannot be constructed.
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        let base = config.url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(StoreError::Config {
                message: "Supabase URL is not set".into(),
                context: Some("services.supabase.url".into()),
            });
        }
        if config.service_key.is_empty() {
            return Err(StoreError::Config {
                message: "Supabase service key is not set".into(),
                context: Some("services.supabase.service_key".into()),
            });
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(config.service_key.expose()).map_err(|_| {
            StoreError::Config {
                message: "Supabase service key is not a valid header value".into(),
                context: Some("services.supabase.service_key".into()),
            }
        })?;
        headers.insert(HeaderName::from_static("apikey"), key);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("building store HTTP client")?;

        Ok(Self {
            client,
            rest_url: format!("{base}/rest/v1"),
            service_key: config.service_key.clone(),
            timeout_secs: config.timeout_secs.max(1),
            documents_table: config.documents_table.clone(),
            blogs_table: config.blogs_table.clone(),
            analytics_table: config.analytics_table.clone(),
            match_function: config.match_function.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{path}", self.rest_url))
            .bearer_auth(self.service_key.expose())
    }

    fn map_error(&self, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout { after_secs: self.timeout_secs, context: None }
        } else {
            StoreError::Request { source: err.without_url(), context: None }
        }
    }

    /// Sends the request and turns non-success statuses into [`StoreError::Status`].
    async fn send(&self, request: RequestBuilder, what: &'static str) -> Result<Response, StoreError> {
        let response = request.send().await.map_err(|e| self.map_error(e)).context(what)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(LOGGED_BODY_CHARS).collect();
        debug!(status = status.as_u16(), body = %snippet, operation = what, "Store rejected request");
        Err(StoreError::Status { status: status.as_u16(), context: Some(what.into()) })
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response, what: &'static str) -> Result<T, StoreError> {
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout { after_secs: self.timeout_secs, context: Some(what.into()) }
            } else {
                StoreError::Decode {
                    message: e.without_url().to_string().into(),
                    context: Some(what.into()),
                }
            }
        })
    }
}

fn non_empty(values: &[String]) -> Option<&[String]> {
    (!values.is_empty()).then_some(values)
}

/// Folds facet rows into sorted, de-duplicated lists, skipping blanks.
fn collect_facets(rows: Vec<FacetRow>) -> FilterOptions {
    let mut content_types = BTreeSet::new();
    let mut locales = BTreeSet::new();
    for row in rows {
        if let Some(ct) = row.content_type.filter(|s| !s.trim().is_empty()) {
            content_types.insert(ct);
        }
        if let Some(locale) = row.locale.filter(|s| !s.trim().is_empty()) {
            locales.insert(locale);
        }
    }
    FilterOptions {
        content_types: content_types.into_iter().collect(),
        locales: locales.into_iter().collect(),
    }
}

#[async_trait]
impl Store for SupabaseStore {
    #[instrument(skip(self))]
    async fn filter_options(&self) -> Result<FilterOptions, StoreError> {
        let request = self
            .request(Method::GET, &self.documents_table)
            .query(&[("select", "content_type,locale")]);
        let response = self.send(request, "filter options").await?;
        let rows: Vec<FacetRow> = self.decode(response, "filter options").await?;
        Ok(collect_facets(rows))
    }

    #[instrument(skip(self, embedding), fields(dimensions = embedding.len()))]
    async fn search(
        &self,
        embedding: &[f32],
        filters: &SearchFilters,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let body = MatchRequest {
            query_embedding: embedding,
            match_threshold: filters.threshold,
            match_count: filters.limit,
            filter_content_types: non_empty(&filters.content_types),
            filter_locales: non_empty(&filters.locales),
        };
        let request =
            self.request(Method::POST, &format!("rpc/{}", self.match_function)).json(&body);
        let response = self.send(request, "vector search").await?;
        let mut hits: Vec<SearchHit> = self.decode(response, "vector search").await?;
        hits.truncate(filters.limit);
        debug!(hits = hits.len(), "Vector search finished");
        Ok(hits)
    }

    #[instrument(skip(self))]
    async fn list_blogs(&self, query: &BlogQuery) -> Result<Vec<BlogPost>, StoreError> {
        let mut params = vec![
            ("select", BLOG_COLUMNS.to_owned()),
            ("order", "published_at.desc.nullslast".to_owned()),
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];
        if let Some(locale) = &query.locale {
            params.push(("locale", format!("eq.{locale}")));
        }
        let request = self.request(Method::GET, &self.blogs_table).query(&params);
        let response = self.send(request, "list blogs").await?;
        self.decode(response, "list blogs").await
    }

    #[instrument(skip(self))]
    async fn get_blog(&self, slug: &str) -> Result<Option<BlogPost>, StoreError> {
        let request = self.request(Method::GET, &self.blogs_table).query(&[
            ("select", BLOG_COLUMNS.to_owned()),
            ("slug", format!("eq.{slug}")),
            ("limit", "1".to_owned()),
        ]);
        let response = self.send(request, "get blog").await?;
        let posts: Vec<BlogPost> = self.decode(response, "get blog").await?;
        Ok(posts.into_iter().next())
    }

    #[instrument(skip(self, document, embedding), fields(id = %document.id))]
    async fn upsert_document(
        &self,
        document: &ContentDocument,
        embedding: &[f32],
    ) -> Result<(), StoreError> {
        let row = DocumentRow {
            id: &document.id,
            title: &document.title,
            content: &document.content,
            url: document.url.as_deref(),
            content_type: &document.content_type,
            locale: &document.locale,
            updated_at: document.updated_at.as_deref(),
            embedding,
        };
        let request = self
            .request(Method::POST, &self.documents_table)
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row]);
        self.send(request, "upsert document").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, id: &str) -> Result<(), StoreError> {
        let request = self
            .request(Method::DELETE, &self.documents_table)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal");
        self.send(request, "delete document").await?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(event = ?record.event))]
    async fn record_event(&self, record: &AnalyticsRecord) -> Result<(), StoreError> {
        let request = self
            .request(Method::POST, &self.analytics_table)
            .header("Prefer", "return=minimal")
            .json(&[record]);
        self.send(request, "record analytics event").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facets_are_sorted_and_deduplicated() {
        let rows = vec![
            FacetRow { content_type: Some("page".into()), locale: Some("fr".into()) },
            FacetRow { content_type: Some("blog".into()), locale: Some("en".into()) },
            FacetRow { content_type: Some("page".into()), locale: None },
            FacetRow { content_type: Some("  ".into()), locale: Some("en".into()) },
        ];
        let options = collect_facets(rows);
        assert_eq!(options.content_types, vec!["blog", "page"]);
        assert_eq!(options.locales, vec!["en", "fr"]);
    }

    #[test]
    fn new_requires_url_and_key() {
        let missing_url = SupabaseStore::new(&SupabaseConfig::default()).expect_err("no url");
        assert!(matches!(missing_url, StoreError::Config { .. }));

        let cfg = SupabaseConfig { url: "https://x.supabase.co".into(), ..SupabaseConfig::default() };
        assert!(matches!(SupabaseStore::new(&cfg), Err(StoreError::Config { .. })));
    }

    #[test]
    fn rest_url_is_derived_from_project_url() {
        let cfg = SupabaseConfig {
            url: "https://x.supabase.co/".into(),
            service_key: Secret::new("service"),
            ..SupabaseConfig::default()
        };
        let store = SupabaseStore::new(&cfg).expect("client");
        assert_eq!(store.rest_url, "https://x.supabase.co/rest/v1");
    }
}
