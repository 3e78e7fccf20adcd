use onion_sift::config::Config;
use onion_sift::crawler::build_direct_client;
use reqwest::Client;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

/// Client that talks to the mock server without a proxy
pub fn direct_client() -> Client {
    build_direct_client("TestAgent/1.0", Duration::from_secs(5)).expect("Failed to build client")
}

/// Port the mock server listens on; doubles as a "SOCKS proxy" for preflight
pub fn server_port(server: &MockServer) -> u16 {
    server.address().port()
}

/// A port nothing listens on
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Configuration with fast timings, writing into `dir`
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.output.output_dir = dir.path().to_string_lossy().to_string();
    config.output.database_path = dir.path().join("archive.db").to_string_lossy().to_string();
    config.transport.proxy_host = "127.0.0.1".to_string();
    config.transport.fetch_timeout_secs = 5;
    config.transport.probe_timeout_secs = 5;
    config.crawler.pause_secs = 0.0;
    config.crawler.crawl_timeout_secs = 30;
    config.bulk.pacing_secs = 0.0;
    config.analysis.backoff_base_ms = 1;
    config
}

pub fn html_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}

/// OpenAI-style completion response body
pub fn completion_body(content: &str, tokens: u64) -> serde_json::Value {
    serde_json::json!({
        "model": "mock/model",
        "choices": [{ "message": { "role": "assistant", "content": content } }],
        "usage": { "total_tokens": tokens }
    })
}
