//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ReportStore trait.

use crate::analysis::AnalysisOutcome;
use crate::failure::FailureCategory;
use crate::output::BulkReport;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ReportStore, StorageError, StorageResult};
use crate::storage::{StoredItem, StoredRun};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, query, started_at, finished_at, elapsed_secs, status, \
     search_results_count, resolvable_count, successful, failed, skipped, config_hash, error";

/// SQLite report archive
pub struct SqliteReportStore {
    conn: Connection,
}

impl SqliteReportStore {
    /// Opens or creates the archive at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteReportStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Full JSON of an archived report
    pub fn get_report_json(&self, run_id: i64) -> StorageResult<String> {
        self.conn
            .query_row(
                "SELECT report_json FROM bulk_runs WHERE id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<StoredRun> {
    Ok(StoredRun {
        id: row.get(0)?,
        query: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        elapsed_secs: row.get(4)?,
        status: row.get(5)?,
        search_results_count: row.get::<_, i64>(6)? as u64,
        resolvable_count: row.get::<_, i64>(7)? as u64,
        successful: row.get::<_, i64>(8)? as u64,
        failed: row.get::<_, i64>(9)? as u64,
        skipped: row.get::<_, i64>(10)? as u64,
        config_hash: row.get(11)?,
        error: row.get(12)?,
    })
}

impl ReportStore for SqliteReportStore {
    fn record_bulk_report(&mut self, report: &BulkReport) -> StorageResult<i64> {
        let report_json = serde_json::to_string(report)?;
        let meta = &report.metadata;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO bulk_runs (query, started_at, finished_at, elapsed_secs, status,
                search_results_count, resolvable_count, successful, failed, skipped,
                config_hash, error, report_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                report.query,
                meta.started_at.to_rfc3339(),
                meta.finished_at.to_rfc3339(),
                meta.elapsed_secs,
                report.status.as_str(),
                report.search_results_count as i64,
                report.resolvable_count as i64,
                report.successful_analyses as i64,
                report.failed_analyses as i64,
                report.skipped as i64,
                meta.config.config_hash,
                report.error,
                report_json,
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        for (position, item) in report.results.iter().enumerate() {
            let model = match &item.analysis {
                Some(AnalysisOutcome::Success { model, .. }) => Some(model.as_str()),
                _ => None,
            };

            tx.execute(
                "INSERT INTO bulk_items (run_id, position, name, url, success, category, error,
                    model, tokens_used, pages_discovered)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    run_id,
                    position as i64,
                    item.target.name,
                    item.target.url,
                    item.success,
                    item.category.map(|c| c.as_str()),
                    item.error,
                    model,
                    item.tokens_used() as i64,
                    item.retrieval.crawl_urls.len() as i64,
                ],
            )?;
        }

        tx.commit()?;

        tracing::debug!(run_id, items = report.results.len(), "Archived bulk report");
        Ok(run_id)
    }

    fn list_runs(&self, limit: usize) -> StorageResult<Vec<StoredRun>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bulk_runs ORDER BY id DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;

        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }

    fn get_run(&self, run_id: i64) -> StorageResult<StoredRun> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM bulk_runs WHERE id = ?1",
            RUN_COLUMNS
        ))?;

        stmt.query_row(params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_run_items(&self, run_id: i64) -> StorageResult<Vec<StoredItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, position, name, url, success, category, error, model,
                    tokens_used, pages_discovered
             FROM bulk_items WHERE run_id = ?1 ORDER BY position",
        )?;

        let items = stmt
            .query_map(params![run_id], |row| {
                Ok(StoredItem {
                    run_id: row.get(0)?,
                    position: row.get::<_, i64>(1)? as u32,
                    name: row.get(2)?,
                    url: row.get(3)?,
                    success: row.get(4)?,
                    category: row
                        .get::<_, Option<String>>(5)?
                        .and_then(|c| FailureCategory::from_str_opt(&c)),
                    error: row.get(6)?,
                    model: row.get(7)?,
                    tokens_used: row.get::<_, i64>(8)? as u64,
                    pages_discovered: row.get::<_, i64>(9)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn count_runs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM bulk_runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
