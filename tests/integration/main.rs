//! Integration tests for Onion-Sift
//!
//! These tests use wiremock to stand in for onion sites, the SOCKS proxy
//! listener and the chat-completion endpoint.

mod analysis_tests;
mod bulk_tests;
mod common;
mod crawl_tests;
mod pipeline_tests;
