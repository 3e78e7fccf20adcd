//! Terminal failure categories shared by retrieval, analysis and reports
//!
//! Every place where a single-target run can end unsuccessfully maps to
//! exactly one [`FailureCategory`]. Per-page and per-link errors inside the
//! crawler never surface here; they are absorbed and logged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a terminal failure for one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// The SOCKS transport is not listening
    TransportUnreachable,
    /// The whole crawl exceeded its wall-clock budget
    Timeout,
    /// The root page timed out
    FetchTimeout,
    /// The root page could not be fetched
    FetchError,
    /// Neither the persisted page nor the crawl produced any content
    EmptyContent,
    /// The analysis endpoint answered 429
    RateLimited,
    /// Transport errors persisted through every retry
    TransientError,
    /// The model output could not be parsed, even loosely
    MalformedOutput,
    /// The analysis endpoint answered with a non-retryable status
    ApiError,
    /// No API key configured for the analysis endpoint
    MissingCredentials,
}

impl FailureCategory {
    /// Returns the wire name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransportUnreachable => "transport_unreachable",
            Self::Timeout => "timeout",
            Self::FetchTimeout => "fetch_timeout",
            Self::FetchError => "fetch_error",
            Self::EmptyContent => "empty_content",
            Self::RateLimited => "rate_limited",
            Self::TransientError => "transient_error",
            Self::MalformedOutput => "malformed_output",
            Self::ApiError => "api_error",
            Self::MissingCredentials => "missing_credentials",
        }
    }

    /// Parses a wire name back into a category
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "transport_unreachable" => Some(Self::TransportUnreachable),
            "timeout" => Some(Self::Timeout),
            "fetch_timeout" => Some(Self::FetchTimeout),
            "fetch_error" => Some(Self::FetchError),
            "empty_content" => Some(Self::EmptyContent),
            "rate_limited" => Some(Self::RateLimited),
            "transient_error" => Some(Self::TransientError),
            "malformed_output" => Some(Self::MalformedOutput),
            "api_error" => Some(Self::ApiError),
            "missing_credentials" => Some(Self::MissingCredentials),
            _ => None,
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorized terminal failure with a human-readable message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub category: FailureCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Failure {
    pub fn new(category: FailureCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

impl std::error::Error for Failure {}
