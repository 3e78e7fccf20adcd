//! Storage traits and error types
//!
//! This module defines the trait interface for report archives and the
//! associated error types.

use crate::output::BulkReport;
use crate::storage::{StoredItem, StoredRun};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Archive of finished bulk runs
pub trait ReportStore {
    /// Stores a bulk report and its items
    ///
    /// # Returns
    ///
    /// The ID of the stored run
    fn record_bulk_report(&mut self, report: &BulkReport) -> StorageResult<i64>;

    /// Lists the most recent runs, newest first
    fn list_runs(&self, limit: usize) -> StorageResult<Vec<StoredRun>>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<StoredRun>;

    /// Gets the items of a run in their original order
    fn get_run_items(&self, run_id: i64) -> StorageResult<Vec<StoredItem>>;

    /// Counts all stored runs
    fn count_runs(&self) -> StorageResult<u64>;
}
