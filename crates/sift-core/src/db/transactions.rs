//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::canonical::CanonicalRow;
use crate::error::Result;
use crate::models::Transaction;

/// Most categories offered to the assistive classifier as choices
pub const KNOWN_CATEGORY_LIMIT: i64 = 50;

const TRANSACTION_COLUMNS: &str = r#"
    id, import_id, txn_date, processed_on, amount_cents, account, txn_type, details,
    category_raw, merchant_raw, category_norm, merchant_norm, notes, row_hash, created_at
"#;

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(2)?;
    let txn_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let created_at: String = row.get(14)?;

    Ok(Transaction {
        id: row.get(0)?,
        import_id: row.get(1)?,
        txn_date,
        processed_on: row.get(3)?,
        amount_cents: row.get(4)?,
        account: row.get(5)?,
        txn_type: row.get(6)?,
        details: row.get(7)?,
        category_raw: row.get(8)?,
        merchant_raw: row.get(9)?,
        category_norm: row.get(10)?,
        merchant_norm: row.get(11)?,
        notes: row.get(12)?,
        row_hash: row.get(13)?,
        created_at: parse_datetime(&created_at),
    })
}

/// Insert one canonical row under `import_id`.
///
/// Runs on the caller's connection so the importer can keep the whole batch
/// in one transaction. A repeated fingerprint fails with a UNIQUE violation.
pub(crate) fn insert_canonical(
    conn: &Connection,
    import_id: i64,
    row: &CanonicalRow,
) -> rusqlite::Result<i64> {
    conn.execute(
        r#"
        INSERT INTO transactions (
            import_id, txn_date, processed_on, amount_cents, account, txn_type,
            details, category_raw, merchant_raw, row_hash
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            import_id,
            row.txn_date.format("%Y-%m-%d").to_string(),
            row.processed_on,
            row.amount_cents,
            row.account,
            row.txn_type,
            row.details,
            row.category_raw,
            row.merchant_raw,
            row.row_hash,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrite the user-editable fields. Returns false if no such transaction.
pub(crate) fn update_editable_fields(
    conn: &Connection,
    id: i64,
    category_norm: &str,
    merchant_norm: &str,
    notes: &str,
) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "UPDATE transactions SET category_norm = ?, merchant_norm = ?, notes = ? WHERE id = ?",
        params![category_norm, merchant_norm, notes, id],
    )?;
    Ok(changed > 0)
}

impl Database {
    /// List transactions, newest first
    pub fn list_transactions(&self, limit: i64, offset: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions ORDER BY txn_date DESC, id DESC LIMIT ? OFFSET ?",
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(params![limit, offset], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// List the rows inserted by one import batch, in insertion order
    pub fn list_transactions_for_import(&self, import_id: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE import_id = ? ORDER BY id",
            TRANSACTION_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(params![import_id], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS),
                params![id],
                row_to_transaction,
            )
            .optional()?;
        Ok(tx)
    }

    /// Count all transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Distinct effective categories seen in the ledger, alphabetical
    pub fn known_categories(&self, limit: i64) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT COALESCE(NULLIF(category_norm, ''), category_raw) AS cat
            FROM transactions
            WHERE COALESCE(NULLIF(category_norm, ''), category_raw) != ''
            ORDER BY cat
            LIMIT ?
            "#,
        )?;

        let categories = stmt
            .query_map(params![limit], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(categories)
    }
}
