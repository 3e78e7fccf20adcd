//! Crawler module for onion-service page retrieval
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through the SOCKS transport
//! - HTML parsing and raw href extraction
//! - The deduplicated, level-ordered frontier
//! - Side-channel link buckets and the crawl log
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod sink;

pub use coordinator::{Coordinator, CrawlError, CrawlResult};
pub use fetcher::{
    build_direct_client, build_http_client, fetch_to_file, fetch_url, FetchError, FetchedPage,
};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{extract_text, parse_page, ParsedPage};
pub use sink::LinkSink;
