//! Analysis dispatcher and extraction strategies
//!
//! Retrieved page text is truncated and submitted to a chat-completion
//! model through one of two interchangeable strategies:
//! - [`DirectCompletion`]: prompt completion expecting JSON, with retry
//! - [`StructuredExtraction`]: schema-constrained extraction with a loose
//!   JSON fallback
//!
//! Both produce an [`AnalysisOutcome`]; nothing in this module returns an
//! error past the dispatcher.

mod client;
mod direct;
mod prompts;
mod schema;
mod structured;

pub use client::{ChatRequest, Completion, CompletionClient, CompletionError, Message};
pub use direct::DirectCompletion;
pub use prompts::DEFAULT_ANALYSIS_PROMPT;
pub use schema::{SiteCategory, SiteIntelligence};
pub use structured::StructuredExtraction;

use crate::config::AnalysisConfig;
use crate::failure::{Failure, FailureCategory};
use crate::SiftError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How a result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    Direct,
    Structured,
}

/// Model output: parsed JSON when possible, raw text otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisPayload {
    Structured(serde_json::Value),
    Text(String),
}

impl AnalysisPayload {
    /// Interprets a raw completion, stripping a surrounding code fence
    pub fn from_completion(content: &str) -> Self {
        let cleaned = strip_code_fences(content);
        match serde_json::from_str::<serde_json::Value>(cleaned) {
            Ok(value) if value.is_object() || value.is_array() => Self::Structured(value),
            _ => Self::Text(content.trim().to_string()),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}

/// Result of one analysis request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Success {
        payload: AnalysisPayload,
        /// Model identifier actually used
        model: String,
        /// 0 when the endpoint reports no usage
        tokens_used: u64,
        method: AnalysisMethod,
        fallback_used: bool,
        attempts: u32,
    },
    Failure {
        failure: Failure,
        attempts: u32,
    },
}

impl AnalysisOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Number of requests sent
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::Failure { attempts, .. } => *attempts,
        }
    }

    /// Attempts beyond the first
    pub fn retries(&self) -> u32 {
        self.attempts().saturating_sub(1)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failure { failure, .. } => Some(failure),
            Self::Success { .. } => None,
        }
    }

    pub fn payload(&self) -> Option<&AnalysisPayload> {
        match self {
            Self::Success { payload, .. } => Some(payload),
            Self::Failure { .. } => None,
        }
    }
}

/// Input handed to a strategy; `content` is already truncated
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    pub content: &'a str,
    pub model: &'a str,
    pub prompt: Option<&'a str>,
}

/// A way of turning page text into an analysis result
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn method(&self) -> AnalysisMethod;

    async fn extract(&self, request: &ExtractionRequest<'_>) -> AnalysisOutcome;
}

/// Chooses a strategy, guards the content size and fills in the model
pub struct AnalysisDispatcher {
    config: AnalysisConfig,
    direct: Option<DirectCompletion>,
    structured: Option<StructuredExtraction>,
}

impl AnalysisDispatcher {
    /// Creates the dispatcher; without an API key every request fails
    /// with `missing_credentials` and nothing is sent
    pub fn new(config: &AnalysisConfig) -> Result<Self, SiftError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty());

        let (direct, structured) = match api_key {
            Some(key) => {
                let client = CompletionClient::new(key, config)?;
                (
                    Some(DirectCompletion::new(client.clone(), config)),
                    Some(StructuredExtraction::new(client, config)),
                )
            }
            None => {
                tracing::warn!("No analysis API key configured");
                (None, None)
            }
        };

        Ok(Self {
            config: config.clone(),
            direct,
            structured,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.direct.is_some()
    }

    /// Model used when the caller gives no hint
    pub fn default_model(&self, use_structured: bool) -> &str {
        if use_structured {
            &self.config.structured_model
        } else {
            &self.config.model
        }
    }

    fn strategy(&self, use_structured: bool) -> Option<&dyn ExtractionStrategy> {
        if use_structured {
            self.structured.as_ref().map(|s| s as &dyn ExtractionStrategy)
        } else {
            self.direct.as_ref().map(|s| s as &dyn ExtractionStrategy)
        }
    }

    /// Analyzes page content
    ///
    /// # Arguments
    ///
    /// * `content` - Page text; truncated to `max_content_chars` characters
    /// * `model_hint` - Overrides the configured model when non-empty
    /// * `prompt_override` - Replaces the default instructions
    /// * `use_structured` - Selects [`StructuredExtraction`] over [`DirectCompletion`]
    pub async fn analyze(
        &self,
        content: &str,
        model_hint: Option<&str>,
        prompt_override: Option<&str>,
        use_structured: bool,
    ) -> AnalysisOutcome {
        let Some(strategy) = self.strategy(use_structured) else {
            return AnalysisOutcome::Failure {
                failure: Failure::new(
                    FailureCategory::MissingCredentials,
                    "Missing OPENROUTER_API_KEY",
                ),
                attempts: 0,
            };
        };

        let model = model_hint
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.default_model(use_structured));
        let prompt = prompt_override.filter(|p| !p.trim().is_empty());
        let content = truncate_chars(content, self.config.max_content_chars);

        tracing::info!(
            model,
            method = ?strategy.method(),
            chars = content.chars().count(),
            "Submitting content for analysis"
        );

        let outcome = strategy
            .extract(&ExtractionRequest {
                content,
                model,
                prompt,
            })
            .await;

        match &outcome {
            AnalysisOutcome::Success { tokens_used, attempts, .. } => {
                tracing::info!(model, tokens_used, attempts, "Analysis completed")
            }
            AnalysisOutcome::Failure { failure, attempts } => {
                tracing::warn!(model, attempts, %failure, "Analysis failed")
            }
        }

        outcome
    }
}

/// Returns the longest prefix of `s` with at most `max_chars` characters
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Removes one surrounding Markdown code fence (with optional language tag)
pub(crate) fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };

    // Drop the language tag on the opening line
    match body.find('\n') {
        Some(newline)
            if body[..newline]
                .trim()
                .chars()
                .all(|c| c.is_ascii_alphanumeric()) =>
        {
            body[newline + 1..].trim()
        }
        _ => body.trim(),
    }
}

/// Parses the text between the first `{` and the last `}` as JSON
pub(crate) fn extract_json_object(raw: &str) -> Option<serde_json::Value> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str(&raw[start..=end]).ok()
}
