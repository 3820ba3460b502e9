//! Import batch records

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::ImportBatch;

fn row_to_batch(row: &Row) -> rusqlite::Result<ImportBatch> {
    let created_at: String = row.get(7)?;
    Ok(ImportBatch {
        id: row.get(0)?,
        source: row.get(1)?,
        file_name: row.get(2)?,
        sha256: row.get(3)?,
        rows_total: row.get(4)?,
        rows_inserted: row.get(5)?,
        rows_skipped: row.get(6)?,
        created_at: parse_datetime(&created_at),
    })
}

/// Open a batch record with zero counts
pub(crate) fn insert_batch(conn: &Connection, source: &str, file_name: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO imports (source, file_name) VALUES (?, ?)",
        params![source, file_name],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Record the final digest and counts for a batch
pub(crate) fn finalize_batch(
    conn: &Connection,
    id: i64,
    sha256: &str,
    rows_total: usize,
    rows_inserted: usize,
    rows_skipped: usize,
) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        UPDATE imports
        SET sha256 = ?, rows_total = ?, rows_inserted = ?, rows_skipped = ?
        WHERE id = ?
        "#,
        params![
            sha256,
            rows_total as i64,
            rows_inserted as i64,
            rows_skipped as i64,
            id
        ],
    )?;
    Ok(())
}

impl Database {
    /// List import batches, newest first
    pub fn list_imports(&self, limit: i64) -> Result<Vec<ImportBatch>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, source, file_name, sha256, rows_total, rows_inserted, rows_skipped, created_at
            FROM imports
            ORDER BY id DESC
            LIMIT ?
            "#,
        )?;

        let batches = stmt
            .query_map(params![limit], row_to_batch)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(batches)
    }

    /// Get a single import batch by ID
    pub fn get_import(&self, id: i64) -> Result<Option<ImportBatch>> {
        let conn = self.conn()?;
        let batch = conn
            .query_row(
                r#"
                SELECT id, source, file_name, sha256, rows_total, rows_inserted, rows_skipped, created_at
                FROM imports
                WHERE id = ?
                "#,
                params![id],
                row_to_batch,
            )
            .optional()?;
        Ok(batch)
    }
}
