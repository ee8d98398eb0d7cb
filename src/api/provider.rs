//! Search provider seam.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::api::types::Post;
use crate::config::DateRange;
use crate::error::Result;

/// Parameters of a submission search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub subreddit: String,
    /// Only posts created before this unix timestamp.
    pub before: Option<i64>,
    /// Only posts created after this unix timestamp.
    pub after: Option<i64>,
    /// Maximum number of posts; `None` for unlimited.
    pub limit: Option<u64>,
}

impl SearchQuery {
    pub fn new(subreddit: impl Into<String>, dates: DateRange) -> Self {
        Self {
            subreddit: subreddit.into(),
            before: dates.before,
            after: dates.after,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Source of submissions for a subreddit.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Estimate of how many posts `query` matches, from a single cheap request.
    async fn estimate_total(&self, query: &SearchQuery) -> Result<u64>;

    /// Lazily stream the posts matching `query` in provider order. Calling
    /// again restarts from the beginning.
    fn search<'a>(&'a self, query: &'a SearchQuery) -> BoxStream<'a, Result<Post>>;
}
