//! Search API response type definitions.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Fields requested from the search provider.
pub const POST_FIELDS: &[&str] = &[
    "id",
    "url",
    "media",
    "media_metadata",
    "permalink",
    "created_utc",
];

/// A submission record returned by the search provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Post {
    pub id: String,

    /// Link target. Missing on some self posts and removed submissions.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub media: Option<PostMedia>,

    /// Gallery item id to item metadata, in source order.
    #[serde(default)]
    pub media_metadata: Option<Map<String, Value>>,

    #[serde(default)]
    pub permalink: String,

    /// Creation time, used for paging.
    #[serde(default)]
    pub created_utc: Option<i64>,
}

/// Embedded media attached to a post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostMedia {
    #[serde(default)]
    pub reddit_video: Option<RedditVideo>,
}

/// Reddit-hosted video information. Still-processing videos carry no
/// fallback url.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedditVideo {
    #[serde(default)]
    pub fallback_url: Option<String>,
}

/// Search response: a page of posts and optional query metadata.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Value>,

    #[serde(default)]
    pub metadata: Option<SearchMetadata>,
}

/// Query metadata returned when `metadata=true` is requested.
#[derive(Debug, Default, Deserialize)]
pub struct SearchMetadata {
    #[serde(default)]
    pub es: Option<EsMetadata>,

    #[serde(default)]
    pub total_results: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EsMetadata {
    #[serde(default)]
    pub hits: Option<EsHits>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EsHits {
    #[serde(default)]
    pub total: Option<EsTotal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EsTotal {
    pub value: u64,
}

impl SearchMetadata {
    /// Total hits estimate, preferring the Elasticsearch figure.
    pub fn total_hits(&self) -> Option<u64> {
        self.es
            .as_ref()
            .and_then(|es| es.hits.as_ref())
            .and_then(|hits| hits.total.as_ref())
            .map(|total| total.value)
            .or(self.total_results)
    }
}
