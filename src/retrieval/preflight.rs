//! Connectivity checks run before a crawl
//!
//! `check_transport` is a hard precondition: if the SOCKS proxy does not
//! accept a TCP connection, nothing else is attempted. `probe_reachability`
//! is advisory only and turns every failure into a warning string.

use crate::config::TransportConfig;
use crate::crawler::fetch_url;
use crate::failure::{Failure, FailureCategory};
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// Outcome of a successful reachability probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub status_code: u16,
    pub latency_ms: u64,
}

/// Opens (and drops) a raw TCP connection to the SOCKS proxy
///
/// # Returns
///
/// * `Ok(())` - The proxy accepted the connection within `connect_timeout`
/// * `Err(Failure)` - Category `transport_unreachable`
pub async fn check_transport(config: &TransportConfig) -> Result<(), Failure> {
    let addr = format!("{}:{}", config.proxy_host, config.proxy_port);

    let outcome = tokio::time::timeout(
        config.connect_timeout(),
        TcpStream::connect((config.proxy_host.as_str(), config.proxy_port)),
    )
    .await;

    match outcome {
        Ok(Ok(_stream)) => {
            tracing::debug!(%addr, "SOCKS proxy accepted connection");
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::warn!(%addr, error = %e, "SOCKS proxy unreachable");
            Err(Failure::new(
                FailureCategory::TransportUnreachable,
                format!("Tor SOCKS proxy is not reachable at {}", addr),
            )
            .with_details(e.to_string()))
        }
        Err(_) => {
            tracing::warn!(%addr, "SOCKS proxy connect timed out");
            Err(Failure::new(
                FailureCategory::TransportUnreachable,
                format!("Tor SOCKS proxy is not reachable at {}", addr),
            )
            .with_details(format!(
                "connect timed out after {} ms",
                config.connect_timeout_ms
            )))
        }
    }
}

/// Issues one GET through the transport and measures its latency
///
/// Any HTTP status in `100..=599` counts as reachable. Errors are returned
/// as a warning message, never as a failure.
pub async fn probe_reachability(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<ProbeReport, String> {
    let started = Instant::now();

    match fetch_url(client, url, timeout).await {
        Ok(page) if (100..=599).contains(&page.status_code) => {
            let report = ProbeReport {
                status_code: page.status_code,
                latency_ms: started.elapsed().as_millis() as u64,
            };
            tracing::info!(url, status = report.status_code, latency_ms = report.latency_ms, "Target reachable");
            Ok(report)
        }
        Ok(page) => Err(format!(
            "Connectivity check for {} returned unexpected status {}",
            url, page.status_code
        )),
        Err(e) => {
            tracing::warn!(url, error = %e, "Connectivity probe failed, continuing");
            Err(format!("Connectivity check for {} failed: {}", url, e))
        }
    }
}
