//! Database schema definitions
//!
//! Two tables: `runs` holds one line per crawl, `spooled_rows` the rows each
//! crawl produced, in the order they were appended.

/// Spool tables and indexes
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    range_start INTEGER NOT NULL,
    range_end INTEGER NOT NULL,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    output_path TEXT
);

-- Rows collected by each run, in crawl order
CREATE TABLE IF NOT EXISTS spooled_rows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    city TEXT NOT NULL,
    category TEXT NOT NULL,
    name TEXT NOT NULL,
    address TEXT NOT NULL,
    score TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_spooled_rows_run ON spooled_rows(run_id);
"#;

/// Creates the spool tables if they are missing
pub fn initialize_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
