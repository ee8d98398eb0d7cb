//! Pushshift submission search client.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use url::Url;

use crate::api::network::USER_AGENT;
use crate::api::provider::{SearchProvider, SearchQuery};
use crate::api::types::{Post, SearchResponse, POST_FIELDS};
use crate::config::SearchConfig;
use crate::download::retry::{with_retry, RetryPolicy};
use crate::error::{Error, Result};

/// Pushshift API client.
pub struct PushshiftApi {
    client: Client,
    endpoint: Url,
    page_size: u32,
    retry_policy: RetryPolicy,
}

impl PushshiftApi {
    /// Create a client for the configured endpoint.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: Url::parse(&config.api_url)?,
            page_size: config.page_size.max(1),
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy used for search requests.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Build the request url for one page.
    fn page_url(&self, query: &SearchQuery, before: Option<i64>, size: u64, metadata: bool) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("subreddit", &query.subreddit)
                .append_pair("size", &size.to_string())
                .append_pair("sort", "desc")
                .append_pair("sort_type", "created_utc")
                .append_pair("fields", &POST_FIELDS.join(","));
            if let Some(before) = before {
                pairs.append_pair("before", &before.to_string());
            }
            if let Some(after) = query.after {
                pairs.append_pair("after", &after.to_string());
            }
            if metadata {
                pairs
                    .append_pair("metadata", "true")
                    .append_pair("track_total_hits", "true");
            }
        }
        url
    }

    /// GET one search page, retrying rate limits and server errors.
    async fn get(&self, url: &Url) -> Result<SearchResponse> {
        with_retry(&self.retry_policy, |_| self.get_once(url))
            .await
            .map_err(|e| e.into_inner())
    }

    async fn get_once(&self, url: &Url) -> Result<SearchResponse> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == 429 {
            return Err(Error::RateLimited(60));
        }
        if status.is_server_error() {
            return Err(Error::ServerError(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "HTTP {}: {}",
                status,
                preview(&body)
            )));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse search response: {} - Response: {}",
                e,
                preview(&text)
            ))
        })
    }

    /// Fetch one page of posts created before `before`.
    async fn fetch_page(
        &self,
        query: &SearchQuery,
        before: Option<i64>,
        size: u64,
    ) -> Result<Vec<Post>> {
        let response = self.get(&self.page_url(query, before, size, false)).await?;

        let posts = response
            .data
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Post>(value) {
                Ok(post) => Some(post),
                Err(e) => {
                    tracing::warn!("Skipping malformed post: {}", e);
                    None
                }
            })
            .collect();

        Ok(posts)
    }
}

/// First few hundred characters of a response body, for error messages.
fn preview(text: &str) -> String {
    text.chars().take(500).collect()
}

#[async_trait]
impl SearchProvider for PushshiftApi {
    async fn estimate_total(&self, query: &SearchQuery) -> Result<u64> {
        let response = self.get(&self.page_url(query, query.before, 1, true)).await?;

        response
            .metadata
            .and_then(|metadata| metadata.total_hits())
            .ok_or_else(|| Error::Api("Search response carried no total hits".into()))
    }

    fn search<'a>(&'a self, query: &'a SearchQuery) -> BoxStream<'a, Result<Post>> {
        let pager = Pager {
            api: self,
            query,
            before: query.before,
            boundary_ids: HashSet::new(),
            buffer: VecDeque::new(),
            yielded: 0,
            exhausted: false,
        };

        stream::unfold(pager, |mut pager| async move {
            let item = pager.next().await?;
            Some((item, pager))
        })
        .boxed()
    }
}

/// Paging state: walks backwards in time from newest to oldest.
///
/// `before` is exclusive on the provider side, so the cursor is set one
/// second past the oldest post of a page and that second is fetched again;
/// ids already yielded for it are dropped. A page made only of such repeats
/// moves the cursor past the second. Posts are lost only when more than a
/// page of them share one second.
struct Pager<'a> {
    api: &'a PushshiftApi,
    query: &'a SearchQuery,
    before: Option<i64>,
    /// Ids yielded with `created_utc == before - 1`.
    boundary_ids: HashSet<String>,
    buffer: VecDeque<Post>,
    yielded: u64,
    exhausted: bool,
}

impl Pager<'_> {
    async fn next(&mut self) -> Option<Result<Post>> {
        loop {
            if self.query.limit.is_some_and(|limit| self.yielded >= limit) {
                return None;
            }

            if let Some(post) = self.buffer.pop_front() {
                self.yielded += 1;
                return Some(Ok(post));
            }

            if self.exhausted {
                return None;
            }

            let size = match self.query.limit {
                Some(limit) => (limit - self.yielded).min(self.api.page_size as u64),
                None => self.api.page_size as u64,
            };

            let page = match self.api.fetch_page(self.query, self.before, size).await {
                Ok(page) => page,
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            };
            self.advance(page);
        }
    }

    /// Buffer the unseen posts of `page` and move the cursor.
    fn advance(&mut self, page: Vec<Post>) {
        let Some(oldest) = page.iter().filter_map(|post| post.created_utc).min() else {
            // Empty, or no way to move the cursor: this is the last page.
            self.exhausted = true;
            self.buffer.extend(page);
            return;
        };

        let fresh: Vec<Post> = page
            .into_iter()
            .filter(|post| !self.boundary_ids.contains(&post.id))
            .collect();

        if fresh.is_empty() {
            if self.before.is_some_and(|before| before <= oldest) {
                self.exhausted = true;
            } else {
                self.before = Some(oldest);
                self.boundary_ids.clear();
            }
            return;
        }

        let next = oldest + 1;
        if self.before != Some(next) {
            self.boundary_ids.clear();
        }
        self.boundary_ids.extend(
            fresh
                .iter()
                .filter(|post| post.created_utc == Some(oldest))
                .map(|post| post.id.clone()),
        );
        self.before = Some(next);
        self.buffer.extend(fresh);
    }
}
