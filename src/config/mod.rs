//! Configuration module for Onion-Sift
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and layering environment overrides on top of them. Precedence is
//! defaults < file < environment.
//!
//! # Example
//!
//! ```no_run
//! use onion_sift::config::load_config;
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("onion-sift.toml")).unwrap();
//! config.apply_env().unwrap();
//! println!("Proxy: {}", config.transport.proxy_url());
//! ```

mod env;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AnalysisConfig, BulkConfig, Config, CrawlerConfig, OutputConfig, SearchConfig,
    TransportConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, load_optional_config};
pub use validation::validate;
