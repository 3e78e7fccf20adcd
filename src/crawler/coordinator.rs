//! Crawler coordinator - depth-bounded crawl of a single onion service
//!
//! The coordinator drives the frontier one level at a time:
//! - Fetching every entry of the level exactly once
//! - Parsing anchors and image-map areas
//! - Classifying links, filing out-of-scope ones into the side buckets
//! - Canonicalizing in-scope links and appending new ones to the frontier
//!
//! Only a failure of the very first fetch (the root) aborts the crawl.
//! Any other fetch failure is written to the crawl log and the page simply
//! contributes no links.

use crate::config::{CrawlerConfig, TransportConfig};
use crate::crawler::fetcher::{fetch_url, FetchError};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::parse_page;
use crate::crawler::sink::LinkSink;
use crate::url::{canonicalize, classify_link};
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Result of a completed crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// Every discovered in-scope URL in insertion order, root first
    pub urls: Vec<String>,
    /// Status of the root response; `None` when no level was crawled
    pub root_status: Option<u16>,
    /// Raw body of the root response
    pub root_body: Vec<u8>,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub levels_completed: u32,
}

/// Errors that abort a crawl
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Root page {url} unreachable: {source}")]
    RootUnreachable {
        url: String,
        #[source]
        source: FetchError,
    },
}

/// Main crawler coordinator structure
pub struct Coordinator {
    root: String,
    depth_limit: u32,
    pause: Duration,
    fetch_timeout: Duration,
    client: Client,
    sink: LinkSink,
    frontier: Frontier,
    root_fetched: bool,
}

impl Coordinator {
    /// Creates a new coordinator for `root`
    ///
    /// # Arguments
    ///
    /// * `root` - The crawl root; links are in scope when prefixed by it
    /// * `depth_limit` - Number of expansion levels (0 crawls nothing)
    /// * `client` - HTTP client, normally routed through the SOCKS proxy
    /// * `sink` - Destination of the side-channel buckets and crawl log
    pub fn new(root: impl Into<String>, depth_limit: u32, client: Client, sink: LinkSink) -> Self {
        let root = root.into();
        let frontier = Frontier::new(&root);

        Self {
            root,
            depth_limit,
            pause: Duration::from_secs(1),
            fetch_timeout: Duration::from_secs(30),
            client,
            sink,
            frontier,
            root_fetched: false,
        }
    }

    /// Creates a coordinator with pause and timeout taken from the configuration
    pub fn from_config(
        root: impl Into<String>,
        depth_limit: u32,
        client: Client,
        sink: LinkSink,
        crawler: &CrawlerConfig,
        transport: &TransportConfig,
    ) -> Self {
        Self::new(root, depth_limit, client, sink)
            .with_pause(crawler.pause())
            .with_fetch_timeout(transport.fetch_timeout())
    }

    /// Sets the delay between consecutive fetches of a level
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Sets the per-request timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Runs the crawl to completion
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - All `depth_limit` levels were processed
    /// * `Err(CrawlError::RootUnreachable)` - The root could not be fetched
    pub async fn run(mut self) -> Result<CrawlResult, CrawlError> {
        let start_time = Instant::now();
        let mut result = CrawlResult::default();

        tracing::info!(root = %self.root, depth = self.depth_limit, "Starting crawl");
        self.sink.log(&format!(
            "Starting crawl of {} with depth {}",
            self.root, self.depth_limit
        ));

        for level in 0..self.depth_limit {
            let entries = self.frontier.next_level();
            let count = entries.len();

            for (index, entry) in entries.iter().enumerate() {
                self.process_entry(entry, &mut result).await?;

                if index + 1 < count && !self.pause.is_zero() {
                    tokio::time::sleep(self.pause).await;
                }
            }

            result.levels_completed = level + 1;
            tracing::info!(
                visited = self.frontier.visited_count(),
                pending = self.frontier.pending_count(),
                "Step {} completed with {} result(s)",
                level + 1,
                self.frontier.len()
            );
            self.sink.log(&format!(
                "Step {} completed with: {} result(s)",
                level + 1,
                self.frontier.len()
            ));
        }

        result.urls = self.frontier.urls();

        tracing::info!(
            "Crawl completed: {} pages fetched, {} failed, {} urls in {:?}",
            result.pages_fetched,
            result.pages_failed,
            result.urls.len(),
            start_time.elapsed()
        );

        Ok(result)
    }

    /// Fetches one frontier entry and expands its links
    async fn process_entry(
        &mut self,
        entry: &FrontierEntry,
        result: &mut CrawlResult,
    ) -> Result<(), CrawlError> {
        let is_root = !self.root_fetched;
        self.root_fetched = true;

        let page = match fetch_url(&self.client, &entry.url, self.fetch_timeout).await {
            Ok(page) => page,
            Err(e) if is_root => {
                tracing::error!(url = %entry.url, error = %e, "Root fetch failed, aborting crawl");
                self.sink.log(&format!("Root fetch failed for {}: {}", entry.url, e));
                return Err(CrawlError::RootUnreachable {
                    url: entry.url.clone(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::warn!(url = %entry.url, error = %e, "Skipping page");
                self.sink.log(&format!("Error fetching {}: {}", entry.url, e));
                result.pages_failed += 1;
                return Ok(());
            }
        };

        result.pages_fetched += 1;
        if !page.is_success() {
            tracing::debug!(url = %entry.url, status = page.status_code, "Parsing non-success page");
        }
        if is_root {
            result.root_status = Some(page.status_code);
            result.root_body = page.body.clone();
        }

        let html = String::from_utf8_lossy(&page.body);
        let parsed = parse_page(&html);

        self.sink.log(&format!(
            "Parsed: [{}] {} ({})",
            page.status_code,
            entry.url,
            parsed.title.as_deref().unwrap_or("untitled")
        ));

        let added = self.handle_discovered_links(&parsed.hrefs, entry.depth + 1);
        tracing::debug!(url = %entry.url, links = parsed.hrefs.len(), added, "Expanded page");

        Ok(())
    }

    /// Classifies links, records out-of-scope ones and queues new in-scope ones
    ///
    /// Returns the number of URLs added to the frontier.
    fn handle_discovered_links(&mut self, hrefs: &[Option<String>], depth: u32) -> usize {
        let mut added = 0;

        for href in hrefs {
            let class = classify_link(href.as_deref(), &self.root);

            if let Some(bucket) = class.bucket() {
                if let Some(link) = href {
                    self.sink.record(bucket, link);
                }
                continue;
            }

            if !class.is_in_scope() {
                continue;
            }

            let Some(link) = href else { continue };
            match canonicalize(link, &self.root) {
                Some(canonical) => {
                    if self.frontier.push(&canonical, depth) {
                        added += 1;
                    }
                }
                None => tracing::trace!(link = %link, "Dropping ambiguous link"),
            }
        }

        added
    }
}
