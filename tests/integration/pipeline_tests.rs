//! Retrieval pipeline tests: preflight, crawl and content resolution

use crate::common::{closed_port, direct_client, html_page, server_port, test_config};
use onion_sift::failure::FailureCategory;
use onion_sift::retrieval::RetrievalPipeline;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_retrieve_returns_root_content() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(
            "Market",
            r#"<p>Welcome to the market</p><a href="/listing.html">Listing</a>"#,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/listing.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Listing", "item")))
        .mount(&server)
        .await;

    let mut config = test_config(&dir);
    config.transport.proxy_port = server_port(&server);

    let pipeline = RetrievalPipeline::with_client(&config, direct_client());
    let outcome = pipeline.retrieve(&server.uri(), 1).await;

    let content = outcome.result.expect("retrieval should succeed");
    assert!(content.contains("Welcome to the market"));

    let report = outcome.report;
    assert!(report.transport_ok);
    assert_eq!(report.normalized_url.as_deref(), Some(server.uri().as_str()));
    assert_eq!(report.probe.as_ref().map(|p| p.status_code), Some(200));
    assert!(report.connectivity_warning.is_none());
    assert_eq!(
        report.crawl_urls,
        vec![server.uri(), format!("{}/listing.html", server.uri())]
    );
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(
        report.text_chars,
        "Market Welcome to the market Listing".chars().count()
    );

    let folder = report.output_folder.expect("output folder");
    assert!(folder.starts_with(dir.path()));
    let persisted = std::fs::read_to_string(folder.join("result.htm")).unwrap();
    assert!(persisted.contains("Welcome to the market"));
    assert!(folder.join("crawler.log").exists());
}

#[tokio::test]
async fn test_closed_proxy_is_transport_unreachable() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("never served"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(&dir);
    config.transport.proxy_port = closed_port();

    let pipeline = RetrievalPipeline::with_client(&config, direct_client());
    let outcome = pipeline.retrieve(&server.uri(), 1).await;

    let failure = outcome.result.unwrap_err();
    assert_eq!(failure.category, FailureCategory::TransportUnreachable);
    assert!(failure.details.is_some());
    assert!(!outcome.report.transport_ok);
}

#[tokio::test]
async fn test_unreachable_root_is_fetch_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut config = test_config(&dir);
    config.transport.proxy_port = server_port(&server);

    let target = format!("http://127.0.0.1:{}", closed_port());
    let pipeline = RetrievalPipeline::with_client(&config, direct_client());
    let outcome = pipeline.retrieve(&target, 1).await;

    let failure = outcome.result.unwrap_err();
    assert_eq!(failure.category, FailureCategory::FetchError);
    assert!(outcome.report.transport_ok);
    assert!(outcome.report.connectivity_warning.is_some());
}

#[tokio::test]
async fn test_empty_page_is_empty_content() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut config = test_config(&dir);
    config.transport.proxy_port = server_port(&server);

    let pipeline = RetrievalPipeline::with_client(&config, direct_client());
    let outcome = pipeline.retrieve(&server.uri(), 1).await;

    assert_eq!(
        outcome.result.unwrap_err().category,
        FailureCategory::EmptyContent
    );
}

#[tokio::test]
async fn test_leftover_result_file_is_not_reused() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let folder = dir
        .path()
        .join(format!("127.0.0.1_{}", server_port(&server)));
    std::fs::create_dir_all(&folder).unwrap();
    let result_path = folder.join("result.htm");
    std::fs::write(&result_path, "stale page from an earlier run").unwrap();

    let mut config = test_config(&dir);
    config.transport.proxy_port = server_port(&server);

    let pipeline = RetrievalPipeline::with_client(&config, direct_client());
    let outcome = pipeline.retrieve(&server.uri(), 0).await;

    assert_eq!(
        outcome.result.unwrap_err().category,
        FailureCategory::EmptyContent
    );
    assert_eq!(outcome.report.output_folder.as_deref(), Some(folder.as_path()));
    let left = std::fs::read_to_string(&result_path).unwrap_or_default();
    assert!(!left.contains("stale"));
}

#[tokio::test]
async fn test_crawl_budget_exceeded_is_timeout() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page(
            "Home",
            r#"<a href="/a.html">a</a><a href="/b.html">b</a>"#,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&dir);
    config.transport.proxy_port = server_port(&server);
    config.crawler.crawl_timeout_secs = 1;

    let pipeline = RetrievalPipeline::with_client(&config, direct_client());
    let outcome = pipeline.retrieve(&server.uri(), 2).await;

    assert_eq!(outcome.result.unwrap_err().category, FailureCategory::Timeout);
}
