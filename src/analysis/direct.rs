use crate::analysis::client::{ChatRequest, CompletionClient, Message};
use crate::analysis::prompts::{direct_user_message, DEFAULT_ANALYSIS_PROMPT, SYSTEM_PROMPT};
use crate::analysis::{AnalysisMethod, AnalysisOutcome, AnalysisPayload, ExtractionRequest, ExtractionStrategy};
use crate::config::AnalysisConfig;
use crate::failure::{Failure, FailureCategory};
use async_trait::async_trait;
use std::time::Duration;

/// Plain prompt completion that asks the model for JSON
///
/// Transient errors (transport failure, timeout, HTTP 5xx) are retried up
/// to `max_attempts` in total with exponential backoff. A rate-limit
/// response ends the attempt loop immediately.
pub struct DirectCompletion {
    client: CompletionClient,
    temperature: f32,
    max_tokens: u32,
    max_attempts: u32,
    backoff_base: Duration,
}

impl DirectCompletion {
    pub fn new(client: CompletionClient, config: &AnalysisConfig) -> Self {
        Self {
            client,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_attempts: config.max_attempts.max(1),
            backoff_base: config.backoff_base(),
        }
    }

    /// Delay slept after failed attempt number `attempt` (1-based)
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(factor)
    }
}

#[async_trait]
impl ExtractionStrategy for DirectCompletion {
    fn method(&self) -> AnalysisMethod {
        AnalysisMethod::Direct
    }

    async fn extract(&self, request: &ExtractionRequest<'_>) -> AnalysisOutcome {
        let prompt = request.prompt.unwrap_or(DEFAULT_ANALYSIS_PROMPT);
        let chat = ChatRequest::new(request.model)
            .message(Message::system(SYSTEM_PROMPT))
            .message(Message::user(direct_user_message(prompt, request.content)))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        let mut attempt = 0;
        loop {
            attempt += 1;

            match self.client.complete(&chat).await {
                Ok(completion) => {
                    return AnalysisOutcome::Success {
                        payload: AnalysisPayload::from_completion(&completion.content),
                        model: completion.model,
                        tokens_used: completion.total_tokens,
                        method: AnalysisMethod::Direct,
                        fallback_used: false,
                        attempts: attempt,
                    };
                }
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient analysis error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if e.is_transient() => {
                    tracing::error!(attempts = attempt, error = %e, "Analysis retries exhausted");
                    return AnalysisOutcome::Failure {
                        failure: Failure::new(
                            FailureCategory::TransientError,
                            format!("Analysis failed after {} attempts", attempt),
                        )
                        .with_details(e.to_string()),
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    tracing::error!(attempt, error = %e, "Analysis request rejected");
                    return AnalysisOutcome::Failure {
                        failure: e.into_failure(),
                        attempts: attempt,
                    };
                }
            }
        }
    }
}
