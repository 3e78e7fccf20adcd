//! Report types for single-target and bulk runs
//!
//! Every terminal report carries a `success` flag, an optional
//! human-readable `error` and optional `details`.

use crate::analysis::AnalysisOutcome;
use crate::failure::{Failure, FailureCategory};
use crate::retrieval::RetrievalReport;
use crate::search::Target;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while writing reports
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Settings a run was executed with; never includes credentials
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigEcho {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,
    pub depth: u32,
    pub use_structured: bool,
    pub model: String,
    pub proxy: String,
    pub pacing_secs: f64,
}

/// Timing and settings of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub config: ConfigEcho,
}

impl RunMetadata {
    /// Closes a run that started at `started_at`
    pub fn finish(started_at: DateTime<Utc>, config: ConfigEcho) -> Self {
        let finished_at = Utc::now();
        let elapsed_secs = (finished_at - started_at).num_milliseconds().max(0) as f64 / 1000.0;
        Self {
            started_at,
            finished_at,
            elapsed_secs,
            config,
        }
    }
}

/// Outcome of retrieving and analyzing one target
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub success: bool,
    pub url: String,
    pub depth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisOutcome>,
    pub retrieval: RetrievalReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FailureCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub metadata: RunMetadata,
}

/// Success flag and failure fields shared by single and bulk results
///
/// A retrieval failure wins over an analysis failure; success requires an
/// analysis outcome that succeeded.
struct Verdict {
    success: bool,
    category: Option<FailureCategory>,
    error: Option<String>,
    details: Option<String>,
}

impl Verdict {
    fn merge(retrieval_failure: Option<Failure>, analysis: Option<&AnalysisOutcome>) -> Self {
        let failure = retrieval_failure.or_else(|| analysis.and_then(|a| a.failure().cloned()));
        let success = failure.is_none() && analysis.is_some_and(|a| a.is_success());

        match failure {
            Some(failure) => Self {
                success,
                category: Some(failure.category),
                error: Some(failure.message),
                details: failure.details,
            },
            None => Self {
                success,
                category: None,
                error: None,
                details: None,
            },
        }
    }
}

impl AnalysisReport {
    /// Builds a report from the two pipeline stages
    ///
    /// `analysis` is `None` when retrieval failed with `retrieval_failure`.
    pub fn new(
        url: impl Into<String>,
        depth: u32,
        retrieval: RetrievalReport,
        retrieval_failure: Option<Failure>,
        analysis: Option<AnalysisOutcome>,
        metadata: RunMetadata,
    ) -> Self {
        let verdict = Verdict::merge(retrieval_failure, analysis.as_ref());

        Self {
            success: verdict.success,
            url: url.into(),
            depth,
            analysis,
            retrieval,
            category: verdict.category,
            error: verdict.error,
            details: verdict.details,
            metadata,
        }
    }
}

/// Outcome of one target in a bulk run
#[derive(Debug, Clone, Serialize)]
pub struct BulkResultItem {
    pub target: Target,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisOutcome>,
    pub retrieval: RetrievalReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FailureCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl BulkResultItem {
    /// Merges retrieval and analysis results for `target`
    pub fn new(
        target: Target,
        retrieval: RetrievalReport,
        retrieval_failure: Option<Failure>,
        analysis: Option<AnalysisOutcome>,
    ) -> Self {
        let verdict = Verdict::merge(retrieval_failure, analysis.as_ref());

        Self {
            success: verdict.success,
            target,
            analysis,
            retrieval,
            category: verdict.category,
            error: verdict.error,
            details: verdict.details,
        }
    }

    /// Tokens spent on this item (0 for failures)
    pub fn tokens_used(&self) -> u64 {
        match &self.analysis {
            Some(AnalysisOutcome::Success { tokens_used, .. }) => *tokens_used,
            _ => 0,
        }
    }
}

/// Overall status of a bulk run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatus {
    AllSucceeded,
    Partial,
    Failed,
}

impl BulkStatus {
    pub fn from_counts(successful: usize, failed: usize) -> Self {
        match (successful, failed) {
            (0, _) => Self::Failed,
            (_, 0) => Self::AllSucceeded,
            _ => Self::Partial,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllSucceeded => "all_succeeded",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

/// Result of a bulk run
#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    pub success: bool,
    pub status: BulkStatus,
    pub query: String,
    pub search_results_count: usize,
    pub resolvable_count: usize,
    pub successful_analyses: usize,
    pub failed_analyses: usize,
    pub skipped: usize,
    pub results: Vec<BulkResultItem>,
    pub metadata: RunMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkReport {
    /// Total tokens used across all successful items
    pub fn total_tokens(&self) -> u64 {
        self.results.iter().map(BulkResultItem::tokens_used).sum()
    }

    /// Success rate over resolvable targets, in percent
    pub fn success_rate(&self) -> f64 {
        if self.resolvable_count == 0 {
            0.0
        } else {
            self.successful_analyses as f64 / self.resolvable_count as f64 * 100.0
        }
    }
}
