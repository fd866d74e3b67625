//! # Store
//!
//! Access to the content store: facet values, vector search, blog posts, document
//! indexing and analytics events. [`Store`] is the seam the gateway depends on;
//! [`SupabaseStore`] speaks the PostgREST dialect exposed by Supabase.

mod error;
mod supabase;

pub use crate::error::{StoreError, StoreErrorExt};
pub use crate::supabase::SupabaseStore;

use async_trait::async_trait;
use sgate_domain::models::{
    AnalyticsRecord, BlogPost, BlogQuery, ContentDocument, FilterOptions, SearchFilters,
    SearchHit,
};
use std::fmt::Debug;

#[async_trait]
pub trait Store: Debug + Send + Sync {
    /// Distinct content types and locales, each sorted and de-duplicated.
    async fn filter_options(&self) -> Result<FilterOptions, StoreError>;

    /// Nearest documents to `embedding`, best match first.
    async fn search(
        &self,
        embedding: &[f32],
        filters: &SearchFilters,
    ) -> Result<Vec<SearchHit>, StoreError>;

    async fn list_blogs(&self, query: &BlogQuery) -> Result<Vec<BlogPost>, StoreError>;

    /// A single post by slug, `None` when it does not exist.
    async fn get_blog(&self, slug: &str) -> Result<Option<BlogPost>, StoreError>;

    /// Inserts or replaces a document together with its embedding.
    async fn upsert_document(
        &self,
        document: &ContentDocument,
        embedding: &[f32],
    ) -> Result<(), StoreError>;

    async fn delete_document(&self, id: &str) -> Result<(), StoreError>;

    async fn record_event(&self, record: &AnalyticsRecord) -> Result<(), StoreError>;
}
