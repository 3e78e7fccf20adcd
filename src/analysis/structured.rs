use crate::analysis::client::{ChatRequest, CompletionClient, Message};
use crate::analysis::prompts::{structured_user_message, STRUCTURED_SYSTEM_PROMPT};
use crate::analysis::schema::SiteIntelligence;
use crate::analysis::{
    extract_json_object, strip_code_fences, AnalysisMethod, AnalysisOutcome, AnalysisPayload,
    ExtractionRequest, ExtractionStrategy,
};
use crate::config::AnalysisConfig;
use crate::failure::{Failure, FailureCategory};
use async_trait::async_trait;

/// Schema-constrained extraction into [`SiteIntelligence`]
///
/// The response is parsed strictly first. When that fails, the text between
/// the first `{` and the last `}` is parsed as loose JSON; only if that
/// fails too is the strict parse error reported.
pub struct StructuredExtraction {
    client: CompletionClient,
    temperature: f32,
    max_tokens: u32,
}

impl StructuredExtraction {
    pub fn new(client: CompletionClient, config: &AnalysisConfig) -> Self {
        Self {
            client,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl ExtractionStrategy for StructuredExtraction {
    fn method(&self) -> AnalysisMethod {
        AnalysisMethod::Structured
    }

    async fn extract(&self, request: &ExtractionRequest<'_>) -> AnalysisOutcome {
        let chat = ChatRequest::new(request.model)
            .message(Message::system(STRUCTURED_SYSTEM_PROMPT))
            .message(Message::user(structured_user_message(request.prompt, request.content)))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        let completion = match self.client.complete(&chat).await {
            Ok(completion) => completion,
            Err(e) => {
                tracing::error!(error = %e, "Structured analysis request failed");
                return AnalysisOutcome::Failure {
                    failure: e.into_failure(),
                    attempts: 1,
                };
            }
        };

        let strict = SiteIntelligence::parse_strict(strip_code_fences(&completion.content))
            .and_then(|intel| serde_json::to_value(intel).map_err(|e| e.to_string()));

        let (payload, fallback_used) = match strict {
            Ok(value) => (value, false),
            Err(parse_error) => match extract_json_object(&completion.content) {
                Some(value) => {
                    tracing::warn!(error = %parse_error, "Strict parse failed, using loose JSON");
                    (value, true)
                }
                None => {
                    tracing::error!(error = %parse_error, "Model output is not parseable JSON");
                    return AnalysisOutcome::Failure {
                        failure: Failure::new(
                            FailureCategory::MalformedOutput,
                            "Structured analysis failed: model output did not match the schema",
                        )
                        .with_details(parse_error),
                        attempts: 1,
                    };
                }
            },
        };

        AnalysisOutcome::Success {
            payload: AnalysisPayload::Structured(payload),
            model: completion.model,
            tokens_used: completion.total_tokens,
            method: AnalysisMethod::Structured,
            fallback_used,
            attempts: 1,
        }
    }
}
