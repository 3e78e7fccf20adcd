//! Onion-Sift: crawl onion services and extract intelligence from them
//!
//! This crate walks onion sites through a SOCKS transport with a bounded,
//! deduplicating crawler, files out-of-scope links into side-channel logs,
//! and hands the retrieved content to a chat-completion model for
//! structured extraction. Bulk runs fan a list of search results through
//! the same pipeline.

pub mod analysis;
pub mod bulk;
pub mod config;
pub mod crawler;
pub mod failure;
pub mod output;
pub mod retrieval;
pub mod search;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Onion-Sift operations
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] crawler::CrawlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid environment override {name}: {message}")]
    Env { name: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Empty URL")]
    Empty,
}

/// Result type alias for Onion-Sift operations
pub type Result<T> = std::result::Result<T, SiftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use analysis::{AnalysisDispatcher, AnalysisOutcome};
pub use bulk::BulkOrchestrator;
pub use config::Config;
pub use crawler::{CrawlResult, Coordinator};
pub use failure::{Failure, FailureCategory};
pub use output::{AnalysisReport, BulkReport};
pub use retrieval::RetrievalPipeline;
pub use search::Target;
pub use url::{canonicalize, classify_link, LinkClass};
