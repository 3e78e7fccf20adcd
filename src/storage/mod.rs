//! Storage module for archiving bulk reports
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Recording finished bulk runs and their per-target items
//! - Listing archived runs for the `history` command

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteReportStore;
pub use traits::{ReportStore, StorageError, StorageResult};

use crate::failure::FailureCategory;
use std::path::Path;

/// Opens (or creates) the report archive at `path`
pub fn open_store(path: &Path) -> StorageResult<SqliteReportStore> {
    SqliteReportStore::new(path)
}

/// An archived bulk run
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    pub id: i64,
    pub query: String,
    pub started_at: String,
    pub finished_at: String,
    pub elapsed_secs: f64,
    pub status: String,
    pub search_results_count: u64,
    pub resolvable_count: u64,
    pub successful: u64,
    pub failed: u64,
    pub skipped: u64,
    pub config_hash: Option<String>,
    pub error: Option<String>,
}

/// An archived per-target result
#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub run_id: i64,
    pub position: u32,
    pub name: String,
    pub url: Option<String>,
    pub success: bool,
    /// Unknown wire names read back as `None`
    pub category: Option<FailureCategory>,
    pub error: Option<String>,
    pub model: Option<String>,
    pub tokens_used: u64,
    pub pages_discovered: u64,
}
