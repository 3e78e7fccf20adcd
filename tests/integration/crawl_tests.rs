//! End-to-end tests of the level-by-level crawler

use crate::common::{direct_client, html_page};
use onion_sift::crawler::{Coordinator, CrawlError, LinkSink};
use onion_sift::url::LinkBucket;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_crawl_expands_levels_and_files_side_links() {
    let server = MockServer::start().await;
    let root = server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            r##"<a href="/page1.html">One</a>
               <a href="page2.php">Two</a>
               <a href="http://other.onion/x">Elsewhere</a>
               <a href="mailto:admin@example.onion">Mail</a>
               <a href="/leak.pdf">Leak</a>
               <a href="#top">Top</a>
               <a>No href</a>"##,
        ),
    )
    .await;
    mount_page(
        &server,
        "/page1.html",
        html_page("One", r#"<a href="/deep.html">Deep</a><a href="/">Home</a>"#),
    )
    .await;
    mount_page(&server, "/page2.php", html_page("Two", "nothing here")).await;

    let sink = LinkSink::new(dir.path(), true);
    let result = Coordinator::new(root.clone(), 2, direct_client(), sink.clone())
        .with_pause(Duration::ZERO)
        .run()
        .await
        .unwrap();

    assert_eq!(result.levels_completed, 2);
    assert_eq!(result.pages_fetched, 3);
    assert_eq!(result.pages_failed, 0);
    assert_eq!(result.root_status, Some(200));
    assert_eq!(
        result.urls,
        vec![
            root.clone(),
            format!("{}/page1.html", root),
            format!("{}/page2.php", root),
            format!("{}/deep.html", root),
        ]
    );

    let external = std::fs::read_to_string(sink.bucket_path(LinkBucket::External)).unwrap();
    assert_eq!(external, "http://other.onion/x\n");
    let mails = std::fs::read_to_string(sink.bucket_path(LinkBucket::Mail)).unwrap();
    assert_eq!(mails, "mailto:admin@example.onion\n");
    let files = std::fs::read_to_string(sink.bucket_path(LinkBucket::File)).unwrap();
    assert_eq!(files, "/leak.pdf\n");

    let log = std::fs::read_to_string(sink.log_path()).unwrap();
    assert!(log.contains("[crawler]"));
    assert!(log.contains("Step 2 completed"));
}

#[tokio::test]
async fn test_depth_zero_fetches_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let result = Coordinator::new(server.uri(), 0, direct_client(), LinkSink::new(dir.path(), false))
        .run()
        .await
        .unwrap();

    assert_eq!(result.urls, vec![server.uri()]);
    assert_eq!(result.pages_fetched, 0);
    assert!(result.root_status.is_none());
}

#[tokio::test]
async fn test_failed_child_page_does_not_abort() {
    let server = MockServer::start().await;
    let root = server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        html_page("Home", r#"<a href="/slow.html">Slow</a><a href="/fine.html">Fine</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/fine.html", html_page("Fine", "ok")).await;

    let result = Coordinator::new(root.clone(), 2, direct_client(), LinkSink::new(dir.path(), true))
        .with_pause(Duration::ZERO)
        .with_fetch_timeout(Duration::from_millis(500))
        .run()
        .await
        .unwrap();

    assert_eq!(result.pages_fetched, 2);
    assert_eq!(result.pages_failed, 1);
    assert_eq!(result.urls.len(), 3);
}

#[tokio::test]
async fn test_non_success_status_is_still_parsed() {
    let server = MockServer::start().await;
    let root = server.uri();
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(html_page("Gone", r#"<a href="/still.html">Still</a>"#)),
        )
        .mount(&server)
        .await;

    let result = Coordinator::new(root.clone(), 1, direct_client(), LinkSink::new(dir.path(), false))
        .run()
        .await
        .unwrap();

    assert_eq!(result.root_status, Some(404));
    assert_eq!(result.urls, vec![root.clone(), format!("{}/still.html", root)]);
}

#[tokio::test]
async fn test_unreachable_root_aborts() {
    let dir = TempDir::new().unwrap();
    let root = format!("http://127.0.0.1:{}", crate::common::closed_port());

    let err = Coordinator::new(root.clone(), 2, direct_client(), LinkSink::new(dir.path(), true))
        .run()
        .await
        .unwrap_err();

    match err {
        CrawlError::RootUnreachable { url, source } => {
            assert_eq!(url, root);
            assert!(!source.is_timeout());
        }
    }
}

#[tokio::test]
async fn test_slow_root_is_a_timeout() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = Coordinator::new(server.uri(), 1, direct_client(), LinkSink::new(dir.path(), false))
        .with_fetch_timeout(Duration::from_millis(300))
        .run()
        .await
        .unwrap_err();

    let CrawlError::RootUnreachable { source, .. } = err;
    assert!(source.is_timeout());
}
