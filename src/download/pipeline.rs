//! Run orchestration: estimate, enumerate, resolve, download.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use futures::StreamExt;

use crate::api::{NetworkClient, SearchProvider, SearchQuery};
use crate::config::DateRange;
use crate::download::fetcher::HttpFetcher;
use crate::download::retry::RetryPolicy;
use crate::download::scheduler::DownloadScheduler;
use crate::download::state::{DownloadOutcome, RunSummary, SkipReason};
use crate::error::Result;
use crate::fs::DiskWriter;
use crate::media::{resolve_post, GifvLookup, ImgurGifvLookup, MediaTargetSet};
use crate::output::{create_spinner, print_info, print_warning, ProgressTracker};

/// Everything a run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub subreddit: String,
    pub dates: DateRange,
    pub download_folder: PathBuf,
    pub pool_limit: usize,
    pub retry_policy: RetryPolicy,
    pub show_progress: bool,
    /// Stop after this many posts.
    pub post_limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Init,
    EstimateCount,
    Enumerate,
    Download,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::EstimateCount => "estimate-count",
            Stage::Enumerate => "enumerate",
            Stage::Download => "download",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

/// One download run for a subreddit.
///
/// The caller owns shutdown: the network client is shared and must be closed
/// whether `run` finishes, fails or is cancelled.
pub struct Pipeline {
    settings: RunSettings,
    provider: Box<dyn SearchProvider>,
    client: Arc<NetworkClient>,
    gifv: Box<dyn GifvLookup>,
}

impl Pipeline {
    pub fn new(
        settings: RunSettings,
        provider: Box<dyn SearchProvider>,
        client: Arc<NetworkClient>,
    ) -> Self {
        Self {
            settings,
            provider,
            client,
            gifv: Box::new(ImgurGifvLookup),
        }
    }

    pub fn with_gifv_lookup(mut self, gifv: Box<dyn GifvLookup>) -> Self {
        self.gifv = gifv;
        self
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let settings = &self.settings;

        enter(Stage::Init);
        let writer = DiskWriter::new(&settings.download_folder, &settings.subreddit)?;
        writer.ensure_root().await?;

        let mut query = SearchQuery::new(&settings.subreddit, settings.dates);
        if let Some(limit) = settings.post_limit {
            query = query.with_limit(limit);
        }
        if settings.dates.is_unbounded() {
            print_info(&format!("Scraping images from r/{}", settings.subreddit));
        } else {
            print_info(&format!(
                "Scraping images from r/{} before {} and after {}",
                settings.subreddit,
                describe_bound(settings.dates.before, "now"),
                describe_bound(settings.dates.after, "the beginning"),
            ));
        }

        enter(Stage::EstimateCount);
        let spinner = settings
            .show_progress
            .then(|| create_spinner("Counting posts..."));
        let estimate = self.provider.estimate_total(&query).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        let estimate = match estimate {
            Ok(estimate) => estimate,
            Err(e) => {
                tracing::warn!("Could not estimate the number of posts: {}", e);
                0
            }
        };
        if estimate == 0 {
            print_warning("No images found. Quitting...");
            return Ok(RunSummary::no_items());
        }
        let estimate = settings.post_limit.map_or(estimate, |limit| estimate.min(limit));
        tracing::info!("About {} posts to examine", estimate);

        enter(Stage::Enumerate);
        let mut summary = RunSummary {
            estimated_posts: estimate,
            ..RunSummary::default()
        };
        let targets = self.collect_targets(&query, estimate, &mut summary).await;
        summary.targets_resolved = targets.len() as u64;
        tracing::info!(
            "Resolved {} targets from {} posts",
            summary.targets_resolved,
            summary.posts_examined
        );

        enter(Stage::Download);
        let scheduler = DownloadScheduler::new(settings.pool_limit, settings.retry_policy.clone());
        let (scheduled, unrecognized) = scheduler.prepare(targets);
        let fetcher = Arc::new(HttpFetcher::new(self.client.handle()?, writer));

        let progress = self.tracker(summary.targets_resolved, "Downloads");
        for _ in &unrecognized {
            progress.advance();
        }
        let mut report = scheduler.run(fetcher, scheduled, &progress).await?;
        for target in unrecognized {
            report.record(
                &target.name,
                &target.url,
                DownloadOutcome::Skipped(SkipReason::UnrecognizedExtension),
            );
        }

        enter(Stage::Report);
        summary.report = Some(report);
        Ok(summary)
    }

    /// Walk the search results in provider order and resolve each post.
    async fn collect_targets(
        &self,
        query: &SearchQuery,
        estimate: u64,
        summary: &mut RunSummary,
    ) -> MediaTargetSet {
        let progress = self.tracker(estimate, "Posts");
        let mut targets = MediaTargetSet::new();
        let mut posts = self.provider.search(query);

        while let Some(item) = posts.next().await {
            match item {
                Ok(post) => {
                    targets.extend(resolve_post(&post, self.gifv.as_ref()));
                    summary.posts_examined += 1;
                    progress.advance();
                }
                Err(e) => {
                    tracing::warn!("Search ended early: {}", e);
                    break;
                }
            }
        }

        progress.finish();
        targets
    }

    fn tracker(&self, total: u64, message: &str) -> ProgressTracker {
        if self.settings.show_progress {
            ProgressTracker::new(total, message)
        } else {
            ProgressTracker::hidden(total)
        }
    }
}

fn enter(stage: Stage) {
    tracing::debug!("Stage: {}", stage);
}

fn describe_bound(timestamp: Option<i64>, unbounded: &str) -> String {
    timestamp
        .and_then(|ts| Local.timestamp_opt(ts, 0).single())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| unbounded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Post, PostMedia, RedditVideo};
    use crate::error::Error;
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FakeProvider {
        estimate: Option<u64>,
        items: Vec<std::result::Result<Post, String>>,
        estimates: AtomicUsize,
        searches: AtomicUsize,
    }

    impl FakeProvider {
        fn new(estimate: Option<u64>, items: Vec<std::result::Result<Post, String>>) -> Self {
            Self {
                estimate,
                items,
                estimates: AtomicUsize::new(0),
                searches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for Arc<FakeProvider> {
        async fn estimate_total(&self, _query: &SearchQuery) -> Result<u64> {
            self.estimates.fetch_add(1, Ordering::SeqCst);
            self.estimate
                .ok_or_else(|| Error::Api("estimate unavailable".into()))
        }

        fn search<'a>(&'a self, query: &'a SearchQuery) -> BoxStream<'a, Result<Post>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            let limit = query.limit.map_or(usize::MAX, |limit| limit as usize);
            let items = self
                .items
                .iter()
                .cloned()
                .take(limit)
                .map(|item| item.map_err(Error::Api));
            stream::iter(items).boxed()
        }
    }

    /// Serves every `.gifv` from one local url.
    struct LocalGifv(String);

    impl GifvLookup for LocalGifv {
        fn resolve(&self, url: &str) -> Option<String> {
            url.ends_with(".gifv").then(|| self.0.clone())
        }
    }

    fn post(id: &str, url: String) -> Post {
        Post {
            id: id.to_string(),
            url: Some(url),
            ..Default::default()
        }
    }

    fn settings(root: &std::path::Path) -> RunSettings {
        RunSettings {
            subreddit: "pics".into(),
            dates: DateRange::default(),
            download_folder: root.to_path_buf(),
            pool_limit: 4,
            retry_policy: RetryPolicy::immediate(2),
            show_progress: false,
            post_limit: None,
        }
    }

    fn client() -> Arc<NetworkClient> {
        Arc::new(NetworkClient::from_client(reqwest::Client::new()))
    }

    #[tokio::test]
    async fn test_zero_estimate_stops_before_search() {
        let temp = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::new(Some(0), Vec::new()));
        let pipeline = Pipeline::new(settings(temp.path()), Box::new(Arc::clone(&provider)), client());

        let summary = pipeline.run().await.unwrap();
        assert!(!summary.reached_download());
        assert_eq!(provider.searches.load(Ordering::SeqCst), 0);
        assert_eq!(provider.estimates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_estimate_error_means_no_items() {
        let temp = tempfile::tempdir().unwrap();
        let provider = Arc::new(FakeProvider::new(None, Vec::new()));
        let pipeline = Pipeline::new(settings(temp.path()), Box::new(Arc::clone(&provider)), client());

        let summary = pipeline.run().await.unwrap();
        assert_eq!(summary, RunSummary::no_items());
        assert_eq!(provider.searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_full_run_sorts_outcomes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p3.jpg"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/g/one.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"one".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/DASH_720.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video".to_vec()))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/anim.gif"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"gif".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let mut gallery = post("g1", "https://www.reddit.com/gallery/g1".into());
        let metadata = json!({
            "a": {"status": "completed", "s": {"u": format!("{}/g/one.jpg?w=1&amp;s=x", server.uri())}},
            "b": {"status": "failed"}
        });
        gallery.media_metadata = metadata.as_object().cloned();

        let mut video = post("v1", "https://v.redd.it/v1".into());
        video.media = Some(PostMedia {
            reddit_video: Some(RedditVideo {
                fallback_url: Some(format!("{}/v1/DASH_720.mp4?source=fallback", server.uri())),
            }),
        });

        let items = vec![
            Ok(post("p1", format!("{}/img.png", server.uri()))),
            Ok(post("p3", format!("{}/p3.jpg", server.uri()))),
            Ok(post("ext", "https://example.com/article".into())),
            Ok(gallery),
            Ok(video),
            Ok(post("gv", "https://i.imgur.com/gv.gifv".into())),
        ];
        let provider = FakeProvider::new(Some(6), items);

        let temp = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(settings(temp.path()), Box::new(Arc::new(provider)), client())
            .with_gifv_lookup(Box::new(LocalGifv(format!("{}/anim.gif", server.uri()))));
        let summary = pipeline.run().await.unwrap();

        assert_eq!(summary.posts_examined, 6);
        assert_eq!(summary.targets_resolved, 5);
        let report = summary.report.unwrap();
        assert_eq!(report.downloaded, 3);
        assert_eq!(report.not_found, 1);
        assert_eq!(report.videos_skipped, 1);
        assert!(report.failed.is_empty());

        let sub = temp.path().join("pics");
        let images = sub.join("images");
        assert_eq!(std::fs::read(images.join("p1.png")).unwrap(), b"png");
        assert_eq!(std::fs::read(images.join("g1_1.jpg")).unwrap(), b"one");
        assert!(!images.join("p3.jpg").exists());
        assert_eq!(std::fs::read(sub.join("gifs").join("gv.gif")).unwrap(), b"gif");
        assert!(!sub.join("videos").exists());
    }

    #[tokio::test]
    async fn test_post_limit_caps_enumeration() {
        let items = (0..5)
            .map(|i| Ok(post(&format!("p{}", i), format!("https://example.com/{}", i))))
            .collect();
        let provider = Arc::new(FakeProvider::new(Some(5), items));

        let temp = tempfile::tempdir().unwrap();
        let mut settings = settings(temp.path());
        settings.post_limit = Some(2);
        let pipeline = Pipeline::new(settings, Box::new(Arc::clone(&provider)), client());

        let summary = pipeline.run().await.unwrap();
        assert_eq!(summary.estimated_posts, 2);
        assert_eq!(summary.posts_examined, 2);
        assert_eq!(summary.report.unwrap().unrecognized, 0);
    }

    #[tokio::test]
    async fn test_search_error_keeps_resolved_targets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"img".to_vec()))
            .mount(&server)
            .await;

        let items = vec![
            Ok(post("p1", format!("{}/a.jpg", server.uri()))),
            Err("page failed".to_string()),
            Ok(post("p2", format!("{}/b.jpg", server.uri()))),
        ];
        let provider = FakeProvider::new(Some(3), items);

        let temp = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(settings(temp.path()), Box::new(Arc::new(provider)), client());
        let summary = pipeline.run().await.unwrap();

        assert_eq!(summary.posts_examined, 1);
        assert_eq!(summary.report.unwrap().downloaded, 1);
    }

    #[tokio::test]
    async fn test_bad_root_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let items = vec![Ok(post("p1", "http://127.0.0.1:9/a.jpg".into()))];
        let provider = Arc::new(FakeProvider::new(Some(1), items));
        let pipeline = Pipeline::new(settings(&blocker), Box::new(Arc::clone(&provider)), client());

        let result = pipeline.run().await;
        assert!(matches!(result, Err(Error::DownloadFolder { .. })));
        assert_eq!(provider.estimates.load(Ordering::SeqCst), 0);
        assert_eq!(provider.searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_closed_client_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let items = vec![Ok(post("p1", "http://127.0.0.1:9/a.jpg".into()))];
        let provider = FakeProvider::new(Some(1), items);
        let client = client();
        client.close();

        let pipeline = Pipeline::new(settings(temp.path()), Box::new(Arc::new(provider)), client);
        assert!(matches!(pipeline.run().await, Err(Error::ClientClosed)));
    }

    #[test]
    fn test_describe_unbounded() {
        assert_eq!(describe_bound(None, "now"), "now");
        assert_eq!(describe_bound(Some(0), "now").len(), 10);
    }
}
