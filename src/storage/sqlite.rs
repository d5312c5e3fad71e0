//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RowStore trait.

use crate::model::{OutputRow, PageRange};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RowStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, range_start, range_end, config_hash, status, output_path";

/// SQLite row spool
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the spool database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
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
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        range: PageRange::new(row.get(3)?, row.get(4)?),
        config_hash: row.get(5)?,
        status: row.get::<_, String>(6)?.parse::<RunStatus>().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(6, Type::Text, e.into())
        })?,
        output_path: row.get(7)?,
    })
}

impl RowStore for SqliteStore {
    // ===== Run Management =====

    fn begin_run(&mut self, range: PageRange, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, range_start, range_end, config_hash, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                now,
                range.start,
                range.end,
                config_hash,
                RunStatus::Running.as_str()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        output_path: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, output_path = ?3 WHERE id = ?4",
            params![status.as_str(), now, output_path, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StorageError::RunNotFound(run_id),
                other => StorageError::Sqlite(other),
            })
    }

    fn list_runs(&self) -> StorageResult<Vec<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC", RUN_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let runs = stmt
            .query_map([], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    // ===== Rows =====

    fn append_rows(&mut self, run_id: i64, rows: &[OutputRow]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO spooled_rows (run_id, city, category, name, address, score)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(params![
                    run_id,
                    row.city,
                    row.category,
                    row.name,
                    row.address,
                    row.score
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_rows(&self, run_id: i64) -> StorageResult<Vec<OutputRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT city, category, name, address, score FROM spooled_rows
             WHERE run_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok(OutputRow {
                    city: row.get(0)?,
                    category: row.get(1)?,
                    name: row.get(2)?,
                    address: row.get(3)?,
                    score: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count_rows(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM spooled_rows WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
