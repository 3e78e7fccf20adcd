//! Minimal client for OpenAI-compatible chat-completion endpoints

use crate::config::AnalysisConfig;
use crate::failure::{Failure, FailureCategory};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Completion request errors
#[derive(Debug, Error)]
pub enum CompletionError {
    /// HTTP 429 from the endpoint
    #[error("Rate limited by analysis API: {body}")]
    RateLimited { body: String },

    /// Any other non-2xx response
    #[error("Analysis API error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Analysis request timed out")]
    Timeout,

    /// Connection failed or the body could not be read
    #[error("Network error: {0}")]
    Transport(String),

    /// Response body was not the expected completion shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl CompletionError {
    /// Returns true for errors worth retrying: transport failures,
    /// timeouts and server-side (5xx) errors
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::Http { status, .. } => *status >= 500,
            Self::RateLimited { .. } | Self::Parse(_) => false,
        }
    }

    /// Maps the error to its terminal failure category
    pub fn into_failure(self) -> Failure {
        let category = match &self {
            Self::RateLimited { .. } => FailureCategory::RateLimited,
            Self::Http { .. } if self.is_transient() => FailureCategory::TransientError,
            Self::Http { .. } => FailureCategory::ApiError,
            Self::Timeout | Self::Transport(_) => FailureCategory::TransientError,
            Self::Parse(_) => FailureCategory::MalformedOutput,
        };

        match self {
            Self::RateLimited { body } => {
                Failure::new(category, "Analysis API rate limit reached").with_details(body)
            }
            Self::Http { status, body } => {
                Failure::new(category, format!("API Error: {}", status)).with_details(body)
            }
            other => Failure::new(category, other.to_string()),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChoiceRaw>,
    #[serde(default)]
    usage: Option<UsageRaw>,
}

#[derive(Debug, Deserialize)]
struct ChoiceRaw {
    message: ChoiceMessageRaw,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessageRaw {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageRaw {
    #[serde(default)]
    total_tokens: u64,
}

/// A successful completion
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    /// Model reported by the endpoint, or the requested one
    pub model: String,
    /// Total tokens; 0 when the endpoint reports no usage
    pub total_tokens: u64,
}

/// Chat-completion client bound to one endpoint and API key
#[derive(Clone)]
pub struct CompletionClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    referer: Option<String>,
    app_title: Option<String>,
}

impl CompletionClient {
    /// Creates a client with the request timeout and headers from `config`
    pub fn new(api_key: impl Into<String>, config: &AnalysisConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            referer: config.referer.clone(),
            app_title: config.app_title.clone(),
        })
    }

    /// Sends one chat completion request
    pub async fn complete(&self, request: &ChatRequest) -> Result<Completion, CompletionError> {
        let start = std::time::Instant::now();

        let mut builder = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.app_title {
            builder = builder.header("X-Title", title);
        }

        let response = builder.json(request).send().await.map_err(|e| {
            warn!(error = %e, "Completion request failed");
            if e.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Analysis API error");
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                CompletionError::RateLimited { body }
            } else {
                CompletionError::Http {
                    status: status.as_u16(),
                    body,
                }
            });
        }

        let raw: ChatResponseRaw = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::Parse(e.to_string())
            }
        })?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| CompletionError::Parse("No choices in completion response".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "Chat completion"
        );

        Ok(Completion {
            content,
            model: raw.model.unwrap_or_else(|| request.model.clone()),
            total_tokens: raw.usage.map(|u| u.total_tokens).unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(CompletionError::Timeout.is_transient());
        assert!(CompletionError::Transport("reset".into()).is_transient());
        assert!(CompletionError::Http {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!CompletionError::Http {
            status: 400,
            body: String::new()
        }
        .is_transient());
        assert!(!CompletionError::RateLimited { body: String::new() }.is_transient());
    }

    #[test]
    fn test_failure_categories() {
        let rate = CompletionError::RateLimited {
            body: "slow down".into(),
        }
        .into_failure();
        assert_eq!(rate.category, FailureCategory::RateLimited);
        assert_eq!(rate.details.as_deref(), Some("slow down"));

        let api = CompletionError::Http {
            status: 401,
            body: "bad key".into(),
        }
        .into_failure();
        assert_eq!(api.category, FailureCategory::ApiError);
        assert_eq!(api.message, "API Error: 401");

        let parse = CompletionError::Parse("eof".into()).into_failure();
        assert_eq!(parse.category, FailureCategory::MalformedOutput);
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest::new("m")
            .message(Message::system("sys"))
            .message(Message::user("hi"))
            .max_tokens(10);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 10);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_response_parsing_without_usage() {
        let raw: ChatResponseRaw =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"ok"}}]}"#).unwrap();
        assert!(raw.usage.is_none());
        assert_eq!(raw.choices.len(), 1);
    }
}
