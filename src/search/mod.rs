//! Onion search index client
//!
//! Queries a clearnet search index over plain HTTPS and turns its result
//! page into [`Target`]s for the bulk orchestrator.

mod parser;

pub use parser::parse_results;

use crate::config::SearchConfig;
use crate::crawler::build_direct_client;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A candidate onion site to analyze
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    /// Onion address; absent when the index did not list one
    pub url: Option<String>,
    pub description: String,
    pub last_seen: String,
}

impl Target {
    /// A target given directly by address
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            name: "Direct target".to_string(),
            url: Some(url.into()),
            description: String::new(),
            last_seen: "Unknown".to_string(),
        }
    }

    /// The address if it is present and not blank
    pub fn resolvable_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// How far back the index is searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecencyWindow {
    Day,
    Week,
    Month,
}

impl RecencyWindow {
    pub fn days(&self) -> u32 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
        }
    }

    /// Accepts exactly 1, 7 or 30
    pub fn from_days(days: u32) -> Option<Self> {
        match days {
            1 => Some(Self::Day),
            7 => Some(Self::Week),
            30 => Some(Self::Month),
            _ => None,
        }
    }
}

/// Search errors
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid search URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Search index returned HTTP {0}")]
    Status(u16),
}

/// Client for the search index
pub struct SearchClient {
    config: SearchConfig,
    client: Client,
}

impl SearchClient {
    pub fn new(config: &SearchConfig, user_agent: &str) -> Result<Self, SearchError> {
        let timeout = Duration::from_secs(config.base_timeout_secs.max(1));
        let client = build_direct_client(user_agent, timeout)?;
        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    /// Builds `<base>/search/?q=<query>[&d=<days>]`
    pub fn search_url(&self, query: &str, window: Option<RecencyWindow>) -> Result<Url, SearchError> {
        let mut url = Url::parse(&self.config.base_url)?.join("/search/")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            if let Some(window) = window {
                pairs.append_pair("d", &window.days().to_string());
            }
        }
        Ok(url)
    }

    /// Queries the index, retrying with growing timeouts
    ///
    /// Attempt `n` (0-based) uses a timeout of `base_timeout * 2^n`; failed
    /// attempts wait `retry_wait * 2^n` before the next one.
    pub async fn search(
        &self,
        query: &str,
        max: usize,
        window: Option<RecencyWindow>,
    ) -> Result<Vec<Target>, SearchError> {
        let url = self.search_url(query, window)?;
        let attempts = self.config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            let factor = 1u32 << attempt.min(16);
            let timeout = Duration::from_secs(self.config.base_timeout_secs).saturating_mul(factor);

            tracing::info!(url = %url, attempt = attempt + 1, attempts, ?timeout, "Searching index");

            match self.fetch_page(&url, timeout).await {
                Ok(html) => {
                    let targets = parse_results(&html, max);
                    tracing::info!(count = targets.len(), "Search results parsed");
                    return Ok(targets);
                }
                Err(e) => {
                    tracing::warn!(attempt = attempt + 1, error = %e, "Search attempt failed");
                    last_error = Some(e);
                    if attempt + 1 < attempts {
                        let wait = Duration::from_millis(self.config.retry_wait_ms).saturating_mul(factor);
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(SearchError::Status(0)))
    }

    async fn fetch_page(&self, url: &Url, timeout: Duration) -> Result<String, SearchError> {
        let response = self.client.get(url.clone()).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Like [`search`](Self::search), but never fails
    ///
    /// A failed or empty search yields placeholder targets so a bulk run can
    /// still exercise the pipeline.
    pub async fn search_with_fallback(
        &self,
        query: &str,
        max: usize,
        window: Option<RecencyWindow>,
    ) -> Vec<Target> {
        match self.search(query, max, window).await {
            Ok(targets) if !targets.is_empty() => targets,
            Ok(_) => {
                tracing::warn!(query, "Search returned no results, using placeholder targets");
                fallback_targets(query, max)
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "Search failed, using placeholder targets");
                fallback_targets(query, max)
            }
        }
    }
}

/// Placeholder targets used when the index is unavailable
pub fn fallback_targets(query: &str, max: usize) -> Vec<Target> {
    let slug: String = query.split_whitespace().collect();

    [
        ("Sample", "Sample site for testing"),
        ("Test", "Another sample site for testing"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (prefix, description))| Target {
        name: format!("{} {} Site", prefix, query),
        url: Some(format!("http://sample{}{}.onion", i + 1, slug)),
        description: description.to_string(),
        last_seen: "Unknown".to_string(),
    })
    .take(max)
    .collect()
}
