//! HTTP fetcher implementation
//!
//! This module handles all page retrieval for the crawler, including:
//! - Building HTTP clients routed through the SOCKS transport
//! - Content-type agnostic GET requests with a per-request timeout
//! - Persisting a fetched body to disk for downstream analysis
//! - Error classification (timeout / connect / other transport failure)

use crate::config::TransportConfig;
use reqwest::{redirect::Policy, Client, Proxy};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// A fetched page, whatever its status code or content type
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value, if any
    pub content_type: Option<String>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Transport-level fetch failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if e.is_connect() {
            Self::Connect {
                url: url.to_string(),
                message: e.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

/// Builds an HTTP client that routes every request through the SOCKS proxy
///
/// The proxy uses the `socks5h` scheme so that `.onion` names are resolved
/// by the proxy rather than locally.
///
/// # Example
///
/// ```no_run
/// use onion_sift::config::TransportConfig;
/// use onion_sift::crawler::build_http_client;
///
/// let client = build_http_client(&TransportConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &TransportConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .proxy(Proxy::all(config.proxy_url())?)
        .timeout(config.fetch_timeout())
        .connect_timeout(Duration::from_secs(30))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds a client without a proxy (clearnet search, local testing)
pub fn build_direct_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.to_string())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its status and raw body
///
/// Any HTTP status is a successful fetch; only transport failures (timeout,
/// refused connection, broken body stream) are errors. The `timeout`
/// bounds the whole request including the body.
pub async fn fetch_url(client: &Client, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status_code = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?
        .to_vec();

    tracing::debug!(url, status_code, bytes = body.len(), "Fetched page");

    Ok(FetchedPage {
        final_url,
        status_code,
        content_type,
        body,
    })
}

/// Fetches a URL and writes its body to `path`
///
/// Shares the transport with [`fetch_url`]; the parent directory is created
/// when missing. The page is returned as well so callers can inspect the
/// status code.
pub async fn fetch_to_file(
    client: &Client,
    url: &str,
    path: &Path,
    timeout: Duration,
) -> Result<FetchedPage, FetchError> {
    let page = fetch_url(client, url, timeout).await?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| FetchError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, &page.body)
        .await
        .map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(url, path = %path.display(), "Persisted page body");

    Ok(page)
}
