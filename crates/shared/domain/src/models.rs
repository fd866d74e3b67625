//! JSON shapes shared between the store client and the route modules.
//!
//! Client-facing fields are camelCase; store rows arrive snake_case, hence the aliases.

use serde::{Deserialize, Serialize};

/// Distinct facet values available for filtering search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    #[serde(alias = "content_types")]
    pub content_types: Vec<String>,
    pub locales: Vec<String>,
}

/// Parameters of a vector search, minus the query vector itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilters {
    pub content_types: Vec<String>,
    pub locales: Vec<String>,
    pub limit: usize,
    pub threshold: f32,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self { content_types: Vec::new(), locales: Vec::new(), limit: 10, threshold: 0.5 }
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(alias = "content_type")]
    pub content_type: String,
    pub locale: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub similarity: f32,
}

/// Paging and filtering for blog listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogQuery {
    pub locale: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for BlogQuery {
    fn default() -> Self {
        Self { locale: None, limit: 20, offset: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub locale: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, alias = "cover_image")]
    pub cover_image: Option<String>,
    #[serde(default, alias = "published_at")]
    pub published_at: Option<String>,
}

/// A piece of indexable content pushed by the CMS webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(alias = "content_type")]
    pub content_type: String,
    pub locale: String,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
}

impl ContentDocument {
    /// The text that gets embedded for this document.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        if self.content.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{}\n\n{}", self.title, self.content)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsKind {
    Search,
    Click,
    Impression,
    FilterChange,
}

/// A row in the analytics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub event: AnalyticsKind,
    pub query: Option<String>,
    pub result_id: Option<String>,
    pub position: Option<u32>,
    pub session_id: Option<String>,
    pub occurred_at: String,
}
