//! Merchant override reads
//!
//! Writes go through the override learner only.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::MerchantOverride;

fn row_to_override(row: &Row) -> rusqlite::Result<MerchantOverride> {
    let updated_at: String = row.get(2)?;
    Ok(MerchantOverride {
        merchant_norm: row.get(0)?,
        category_norm: row.get(1)?,
        updated_at: parse_datetime(&updated_at),
    })
}

/// Insert or replace the category for a merchant
pub(crate) fn upsert_override(
    conn: &Connection,
    merchant_norm: &str,
    category_norm: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO merchant_category_overrides (merchant_norm, category_norm)
        VALUES (?, ?)
        ON CONFLICT(merchant_norm) DO UPDATE SET
            category_norm = excluded.category_norm,
            updated_at = CURRENT_TIMESTAMP
        "#,
        params![merchant_norm, category_norm],
    )?;
    Ok(())
}

impl Database {
    /// Exact-match override lookup
    pub fn get_override(&self, merchant_norm: &str) -> Result<Option<MerchantOverride>> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                r#"
                SELECT merchant_norm, category_norm, updated_at
                FROM merchant_category_overrides
                WHERE merchant_norm = ?
                "#,
                params![merchant_norm],
                row_to_override,
            )
            .optional()?;
        Ok(found)
    }

    /// All overrides, alphabetical by merchant
    pub fn list_overrides(&self) -> Result<Vec<MerchantOverride>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT merchant_norm, category_norm, updated_at
            FROM merchant_category_overrides
            ORDER BY merchant_norm
            "#,
        )?;

        let overrides = stmt
            .query_map([], row_to_override)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(overrides)
    }
}
