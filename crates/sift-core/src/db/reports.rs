//! Spending reports

use chrono::NaiveDate;
use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::{CategorySpend, SpendingSummary, UNCATEGORISED};

impl Database {
    /// Spend per effective category from `since` onward, largest first.
    ///
    /// Only outflows count. Categories with no spend in the period are left out.
    pub fn spending_by_category(&self, since: NaiveDate) -> Result<Vec<CategorySpend>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT COALESCE(NULLIF(category_norm, ''), NULLIF(category_raw, ''), ?2) AS cat,
                   SUM(-amount_cents) AS spend,
                   COUNT(*)
            FROM transactions
            WHERE txn_date >= ?1 AND amount_cents < 0
            GROUP BY cat
            ORDER BY spend DESC, cat
            "#,
        )?;

        let categories = stmt
            .query_map(params![since.to_string(), UNCATEGORISED], |row| {
                Ok(CategorySpend {
                    category: row.get(0)?,
                    spend_cents: row.get(1)?,
                    transaction_count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Total inflow and outflow from `since` onward, both as positive minor units
    pub fn income_and_expense(&self, since: NaiveDate) -> Result<(i64, i64)> {
        let conn = self.conn()?;
        let totals = conn.query_row(
            r#"
            SELECT COALESCE(SUM(CASE WHEN amount_cents > 0 THEN amount_cents ELSE 0 END), 0),
                   COALESCE(SUM(CASE WHEN amount_cents < 0 THEN -amount_cents ELSE 0 END), 0)
            FROM transactions
            WHERE txn_date >= ?
            "#,
            params![since.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(totals)
    }

    pub fn spending_summary(&self, since: NaiveDate) -> Result<SpendingSummary> {
        let (income_cents, expense_cents) = self.income_and_expense(since)?;
        Ok(SpendingSummary {
            since,
            income_cents,
            expense_cents,
            categories: self.spending_by_category(since)?,
        })
    }
}
