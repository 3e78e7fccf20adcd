//! Single-target retrieval
//!
//! Normalizes the target, checks the SOCKS transport, probes the site,
//! crawls it under a wall-clock budget and resolves the text handed to
//! analysis. Files written by earlier runs are never read back as content.

use crate::config::{Config, CrawlerConfig, TransportConfig};
use crate::crawler::{
    build_http_client, extract_text, fetch_to_file, Coordinator, CrawlError, CrawlResult, LinkSink,
};
use crate::failure::{Failure, FailureCategory};
use crate::retrieval::preflight::{check_transport, probe_reachability, ProbeReport};
use crate::url::{normalize_target_url, output_folder_name};
use crate::SiftError;
use reqwest::Client;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Diagnostics collected while retrieving one target
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrievalReport {
    pub normalized_url: Option<String>,
    pub transport_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity_warning: Option<String>,
    pub crawl_urls: Vec<String>,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    /// Visible characters of the retrieved page
    pub text_chars: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_folder: Option<PathBuf>,
}

/// Content of a target, or the reason there is none
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub result: Result<String, Failure>,
    pub report: RetrievalReport,
}

impl RetrievalOutcome {
    fn failed(failure: Failure, report: RetrievalReport) -> Self {
        Self {
            result: Err(failure),
            report,
        }
    }
}

/// Preflight, crawl and content extraction for a single onion target
pub struct RetrievalPipeline {
    transport: TransportConfig,
    crawler: CrawlerConfig,
    output_dir: PathBuf,
    client: Client,
}

impl RetrievalPipeline {
    /// Creates a pipeline whose client routes through the configured SOCKS proxy
    pub fn new(config: &Config) -> Result<Self, SiftError> {
        let client = build_http_client(&config.transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Creates a pipeline around an existing HTTP client
    pub fn with_client(config: &Config, client: Client) -> Self {
        Self {
            transport: config.transport.clone(),
            crawler: config.crawler.clone(),
            output_dir: PathBuf::from(&config.output.output_dir),
            client,
        }
    }

    /// Retrieves the text content of `url`, crawling `depth` levels first
    ///
    /// Steps: target normalization, SOCKS preflight (fatal), reachability
    /// probe (advisory), crawl plus terminal fetch under the crawl timeout,
    /// content resolution and lossy UTF-8 decoding.
    pub async fn retrieve(&self, url: &str, depth: u32) -> RetrievalOutcome {
        let mut report = RetrievalReport::default();

        let target = match normalize_target_url(url) {
            Ok(target) => target,
            Err(e) => {
                return RetrievalOutcome::failed(
                    Failure::new(FailureCategory::FetchError, format!("Invalid target URL: {}", url))
                        .with_details(e.to_string()),
                    report,
                );
            }
        };
        report.normalized_url = Some(target.clone());

        if let Err(failure) = check_transport(&self.transport).await {
            return RetrievalOutcome::failed(failure, report);
        }
        report.transport_ok = true;

        match probe_reachability(&self.client, &target, self.transport.probe_timeout()).await {
            Ok(probe) => report.probe = Some(probe),
            Err(warning) => report.connectivity_warning = Some(warning),
        }

        let folder = self.output_dir.join(output_folder_name(&target));
        report.output_folder = Some(folder.clone());
        let result_path = folder.join(&self.crawler.result_file_name);

        tracing::info!(url = %target, depth, folder = %folder.display(), "Retrieving target");

        let crawl = tokio::time::timeout(
            self.crawler.crawl_timeout(),
            self.crawl_and_persist(&target, depth, &folder, &result_path),
        )
        .await;

        let (crawl_result, persisted) = match crawl {
            Err(_) => {
                tracing::warn!(url = %target, "Crawl exceeded its time budget");
                return RetrievalOutcome::failed(
                    Failure::new(
                        FailureCategory::Timeout,
                        format!(
                            "Crawl of {} timed out after {} seconds",
                            target, self.crawler.crawl_timeout_secs
                        ),
                    ),
                    report,
                );
            }
            Ok(Err(CrawlError::RootUnreachable { url, source })) => {
                let category = if source.is_timeout() {
                    FailureCategory::FetchTimeout
                } else {
                    FailureCategory::FetchError
                };
                return RetrievalOutcome::failed(
                    Failure::new(category, format!("Failed to fetch {}", url))
                        .with_details(source.to_string()),
                    report,
                );
            }
            Ok(Ok(crawled)) => crawled,
        };

        report.crawl_urls = crawl_result.urls.clone();
        report.pages_fetched = crawl_result.pages_fetched;
        report.pages_failed = crawl_result.pages_failed;

        let body = resolve_content(persisted, &crawl_result);
        if body.is_empty() {
            return RetrievalOutcome::failed(
                Failure::new(
                    FailureCategory::EmptyContent,
                    format!("No content retrieved from {}", target),
                ),
                report,
            );
        }

        let content = String::from_utf8_lossy(&body).into_owned();
        report.text_chars = extract_text(&content).chars().count();
        tracing::info!(
            url = %target,
            chars = content.chars().count(),
            text_chars = report.text_chars,
            "Retrieved content"
        );

        RetrievalOutcome {
            result: Ok(content),
            report,
        }
    }

    /// Crawls `depth` levels, then fetches the target once more into `result_path`
    ///
    /// Returns the crawl result and the body written by this terminal fetch.
    /// A failed terminal fetch is not an error; any file left at
    /// `result_path` by an earlier run is removed first so it can never stand
    /// in for this run's content.
    async fn crawl_and_persist(
        &self,
        target: &str,
        depth: u32,
        folder: &Path,
        result_path: &Path,
    ) -> Result<(CrawlResult, Option<Vec<u8>>), CrawlError> {
        let sink = LinkSink::new(folder, self.crawler.write_logs);
        let coordinator = Coordinator::from_config(
            target,
            depth,
            self.client.clone(),
            sink.clone(),
            &self.crawler,
            &self.transport,
        );
        let result = coordinator.run().await?;

        match tokio::fs::remove_file(result_path).await {
            Ok(()) => tracing::debug!(path = %result_path.display(), "Removed previous result file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %result_path.display(), error = %e, "Could not remove previous result file"),
        }

        let persisted =
            match fetch_to_file(&self.client, target, result_path, self.transport.fetch_timeout()).await {
                Ok(page) => {
                    sink.log(&format!(
                        "Saved [{}] {} to {}",
                        page.status_code,
                        target,
                        result_path.display()
                    ));
                    Some(page.body)
                }
                Err(e) => {
                    tracing::warn!(url = %target, error = %e, "Terminal fetch failed");
                    sink.log(&format!("Error saving {}: {}", target, e));
                    None
                }
            };

        Ok((result, persisted))
    }
}

/// Prefers this run's persisted page, then the crawl's captured root body
fn resolve_content(persisted: Option<Vec<u8>>, crawl: &CrawlResult) -> Vec<u8> {
    match persisted {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => crawl.root_body.clone(),
    }
}
