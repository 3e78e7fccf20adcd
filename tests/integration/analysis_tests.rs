//! Analysis dispatcher tests against a mock chat-completion endpoint

use crate::common::completion_body;
use onion_sift::analysis::{AnalysisDispatcher, AnalysisMethod, AnalysisOutcome, AnalysisPayload};
use onion_sift::config::AnalysisConfig;
use onion_sift::failure::FailureCategory;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn analysis_config(server: &MockServer) -> AnalysisConfig {
    AnalysisConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        max_attempts: 3,
        backoff_base_ms: 1,
        request_timeout_secs: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_direct_success_with_text_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("This site sells stolen data.", 321)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = AnalysisDispatcher::new(&analysis_config(&server)).unwrap();
    let outcome = dispatcher.analyze("page text", None, None, false).await;

    match outcome {
        AnalysisOutcome::Success {
            payload,
            model,
            tokens_used,
            method,
            fallback_used,
            attempts,
        } => {
            assert_eq!(payload, AnalysisPayload::Text("This site sells stolen data.".into()));
            assert_eq!(model, "mock/model");
            assert_eq!(tokens_used, 321);
            assert_eq!(method, AnalysisMethod::Direct);
            assert!(!fallback_used);
            assert_eq!(attempts, 1);
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_direct_json_payload_is_structured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("```json\n{\"summary\": \"forum\"}\n```", 10)),
        )
        .mount(&server)
        .await;

    let dispatcher = AnalysisDispatcher::new(&analysis_config(&server)).unwrap();
    let outcome = dispatcher.analyze("page text", None, None, false).await;

    let payload = outcome.payload().expect("payload");
    assert!(payload.is_structured());
}

#[tokio::test]
async fn test_rate_limit_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = AnalysisDispatcher::new(&analysis_config(&server)).unwrap();
    let outcome = dispatcher.analyze("page text", None, None, false).await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.failure().unwrap().category, FailureCategory::RateLimited);
    assert_eq!(outcome.attempts(), 1);
}

#[tokio::test]
async fn test_server_errors_retried_up_to_max_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(3)
        .mount(&server)
        .await;

    let dispatcher = AnalysisDispatcher::new(&analysis_config(&server)).unwrap();
    let outcome = dispatcher.analyze("page text", None, None, false).await;

    let failure = outcome.failure().expect("failure");
    assert_eq!(failure.category, FailureCategory::TransientError);
    assert_eq!(outcome.attempts(), 3);
    assert_eq!(outcome.retries(), 2);
}

#[tokio::test]
async fn test_client_error_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = AnalysisDispatcher::new(&analysis_config(&server)).unwrap();
    let outcome = dispatcher.analyze("page text", None, None, false).await;

    let failure = outcome.failure().expect("failure");
    assert_eq!(failure.category, FailureCategory::ApiError);
    assert_eq!(failure.message, "API Error: 401");
}

#[tokio::test]
async fn test_structured_falls_back_to_loose_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "Sure! Here is what I found: {\"site_name\": \"Shop\", \"extra\": true} Hope it helps.",
            77,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = AnalysisDispatcher::new(&analysis_config(&server)).unwrap();
    let outcome = dispatcher.analyze("page text", None, None, true).await;

    match outcome {
        AnalysisOutcome::Success {
            payload,
            method,
            fallback_used,
            tokens_used,
            ..
        } => {
            assert_eq!(method, AnalysisMethod::Structured);
            assert!(fallback_used);
            assert_eq!(tokens_used, 77);
            match payload {
                AnalysisPayload::Structured(value) => assert_eq!(value["site_name"], "Shop"),
                other => panic!("expected structured payload, got {:?}", other),
            }
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_structured_unparseable_output_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("no json at all", 5)),
        )
        .mount(&server)
        .await;

    let dispatcher = AnalysisDispatcher::new(&analysis_config(&server)).unwrap();
    let outcome = dispatcher.analyze("page text", None, None, true).await;

    assert_eq!(
        outcome.failure().unwrap().category,
        FailureCategory::MalformedOutput
    );
}

#[tokio::test]
async fn test_missing_key_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("x", 1)))
        .expect(0)
        .mount(&server)
        .await;

    let config = AnalysisConfig {
        api_key: None,
        ..analysis_config(&server)
    };
    let dispatcher = AnalysisDispatcher::new(&config).unwrap();
    let outcome = dispatcher.analyze("page text", None, None, false).await;

    assert_eq!(
        outcome.failure().unwrap().category,
        FailureCategory::MissingCredentials
    );
    assert_eq!(outcome.attempts(), 0);
}
