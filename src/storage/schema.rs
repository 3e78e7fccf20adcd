//! Database schema definitions
//!
//! This module contains the SQL schema of the Onion-Sift report archive.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per bulk run
CREATE TABLE IF NOT EXISTS bulk_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    query TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    elapsed_secs REAL NOT NULL,
    status TEXT NOT NULL,
    search_results_count INTEGER NOT NULL,
    resolvable_count INTEGER NOT NULL,
    successful INTEGER NOT NULL,
    failed INTEGER NOT NULL,
    skipped INTEGER NOT NULL,
    config_hash TEXT,
    error TEXT,
    report_json TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_bulk_runs_started ON bulk_runs(started_at);

-- One row per analyzed target
CREATE TABLE IF NOT EXISTS bulk_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES bulk_runs(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    url TEXT,
    success INTEGER NOT NULL,
    category TEXT,
    error TEXT,
    model TEXT,
    tokens_used INTEGER NOT NULL DEFAULT 0,
    pages_discovered INTEGER NOT NULL DEFAULT 0,
    UNIQUE(run_id, position)
);

CREATE INDEX IF NOT EXISTS idx_bulk_items_run ON bulk_items(run_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
