//! Bulk orchestration tests, from target list to archived report

use crate::common::{completion_body, direct_client, html_page, server_port, test_config};
use onion_sift::analysis::AnalysisDispatcher;
use onion_sift::bulk::{AnalyzeOptions, BulkOptions};
use onion_sift::output::{save_report_json, BulkStatus};
use onion_sift::retrieval::RetrievalPipeline;
use onion_sift::search::Target;
use onion_sift::storage::{ReportStore, SqliteReportStore};
use onion_sift::{BulkOrchestrator, Config, FailureCategory};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(
            "Forum",
            r#"<p>Discussion board</p><a href="/rules.html">Rules</a>"#,
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mirror.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(html_page("Mirror", "<p>Mirror page</p>")),
        )
        .mount(server)
        .await;
}

async fn mount_completions(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("A discussion forum.", 50)),
        )
        .expect(expected)
        .mount(server)
        .await;
}

fn orchestrator(config: &Config) -> BulkOrchestrator {
    let pipeline = RetrievalPipeline::with_client(config, direct_client());
    let dispatcher = AnalysisDispatcher::new(&config.analysis).unwrap();
    BulkOrchestrator::with_parts(config, pipeline, dispatcher)
}

fn target(name: &str, url: Option<String>) -> Target {
    Target {
        name: name.to_string(),
        url,
        description: "No description provided".to_string(),
        last_seen: "Unknown".to_string(),
    }
}

#[tokio::test]
async fn test_bulk_run_skips_unresolvable_and_archives() {
    let site = MockServer::start().await;
    let api = MockServer::start().await;
    mount_site(&site).await;
    mount_completions(&api, 2).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    config.transport.proxy_port = server_port(&site);
    config.analysis.base_url = api.uri();
    config.analysis.api_key = Some("test-key".to_string());

    let targets = vec![
        target("Forum", Some(site.uri())),
        target("Ghost", None),
        target("Mirror", Some(format!("{}/mirror.html", site.uri()))),
    ];
    let options = BulkOptions {
        depth: 1,
        config_hash: Some("cafebabe".to_string()),
        ..Default::default()
    };

    let report = orchestrator(&config).run("forum", targets, &options).await;

    assert!(report.success);
    assert_eq!(report.status, BulkStatus::AllSucceeded);
    assert_eq!(report.search_results_count, 3);
    assert_eq!(report.resolvable_count, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.successful_analyses, 2);
    assert_eq!(report.failed_analyses, 0);
    assert_eq!(report.total_tokens(), 100);
    assert_eq!(report.results[0].target.name, "Forum");
    assert_eq!(report.results[1].target.name, "Mirror");
    assert!(report.error.is_none());

    let saved = dir.path().join("reports").join("bulk.json");
    save_report_json(&report, &saved).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(json["status"], "all_succeeded");
    assert_eq!(json["metadata"]["config"]["config_hash"], "cafebabe");
    assert!(!json.to_string().contains("test-key"));

    let mut store = SqliteReportStore::new(&dir.path().join("archive.db")).unwrap();
    let run_id = store.record_bulk_report(&report).unwrap();
    let items = store.get_run_items(run_id).unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.success));
    assert_eq!(items[0].pages_discovered, 2);
}

#[tokio::test]
async fn test_bulk_run_partial_when_analysis_fails_for_one() {
    let site = MockServer::start().await;
    let api = MockServer::start().await;
    mount_site(&site).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&api)
        .await;
    mount_completions(&api, 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    config.transport.proxy_port = server_port(&site);
    config.analysis.base_url = api.uri();
    config.analysis.api_key = Some("test-key".to_string());

    let targets = vec![
        target("First", Some(site.uri())),
        target("Second", Some(format!("{}/mirror.html", site.uri()))),
    ];

    let report = orchestrator(&config)
        .run("forum", targets, &BulkOptions::default())
        .await;

    assert_eq!(report.status, BulkStatus::Partial);
    assert!(report.success);
    assert_eq!(report.results[0].category, Some(FailureCategory::RateLimited));
    assert!(report.results[1].success);
    assert_eq!(
        report.successful_analyses + report.failed_analyses,
        report.resolvable_count
    );
}

#[tokio::test]
async fn test_analyze_single_end_to_end() {
    let site = MockServer::start().await;
    let api = MockServer::start().await;
    mount_site(&site).await;
    mount_completions(&api, 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    config.transport.proxy_port = server_port(&site);
    config.analysis.base_url = api.uri();
    config.analysis.api_key = Some("test-key".to_string());

    let options = AnalyzeOptions {
        depth: 1,
        ..Default::default()
    };
    let report = orchestrator(&config).analyze_single(&site.uri(), &options).await;

    assert!(report.success);
    assert!(report.error.is_none());
    assert_eq!(report.retrieval.crawl_urls.len(), 2);
    assert_eq!(report.analysis.as_ref().map(|a| a.attempts()), Some(1));
    assert_eq!(report.metadata.config.model, config.analysis.model);
}
