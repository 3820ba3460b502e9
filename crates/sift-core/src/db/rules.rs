//! Category rule operations
//!
//! Rules form an explicit sequence. `position` holds the declared order and
//! new rules are appended at the end; the resolver takes the first match.

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::CategoryRule;

const RULE_COLUMNS: &str = "id, match_contains, category_norm, enabled, position, created_at";

fn row_to_rule(row: &Row) -> rusqlite::Result<CategoryRule> {
    let created_at: String = row.get(5)?;
    Ok(CategoryRule {
        id: row.get(0)?,
        pattern: row.get(1)?,
        category: row.get(2)?,
        enabled: row.get(3)?,
        position: row.get(4)?,
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Append a rule to the end of the declared order
    pub fn create_rule(&self, pattern: &str, category: &str) -> Result<i64> {
        let pattern = pattern.trim();
        let category = category.trim();
        if pattern.is_empty() {
            return Err(Error::InvalidData("Rule pattern cannot be empty".into()));
        }
        if category.is_empty() {
            return Err(Error::InvalidData("Rule category cannot be empty".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO category_rules (match_contains, category_norm, enabled, position)
            VALUES (?, ?, 1, (SELECT COALESCE(MAX(position), -1) + 1 FROM category_rules))
            "#,
            params![pattern, category],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// All rules in declared order
    pub fn list_rules(&self) -> Result<Vec<CategoryRule>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM category_rules ORDER BY position ASC, id ASC",
            RULE_COLUMNS
        ))?;

        let rules = stmt
            .query_map([], row_to_rule)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rules)
    }

    /// Enabled rules in declared order
    pub fn list_enabled_rules(&self) -> Result<Vec<CategoryRule>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM category_rules WHERE enabled = 1 ORDER BY position ASC, id ASC",
            RULE_COLUMNS
        ))?;

        let rules = stmt
            .query_map([], row_to_rule)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rules)
    }

    pub fn get_rule(&self, id: i64) -> Result<Option<CategoryRule>> {
        let conn = self.conn()?;
        let rule = conn
            .query_row(
                &format!("SELECT {} FROM category_rules WHERE id = ?", RULE_COLUMNS),
                params![id],
                row_to_rule,
            )
            .optional()?;
        Ok(rule)
    }

    pub fn set_rule_enabled(&self, id: i64, enabled: bool) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE category_rules SET enabled = ? WHERE id = ?",
            params![enabled, id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Rule {} not found", id)));
        }
        Ok(())
    }

    pub fn delete_rule(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM category_rules WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Rule {} not found", id)));
        }
        Ok(())
    }

    /// Move a rule to a zero-based index in the declared order.
    ///
    /// Indexes past the end move the rule last. Positions are renumbered
    /// densely in one transaction.
    pub fn move_rule(&self, id: i64, index: usize) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut ids: Vec<i64> = {
            let mut stmt =
                tx.prepare("SELECT id FROM category_rules ORDER BY position ASC, id ASC")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            ids
        };

        let current = ids
            .iter()
            .position(|&r| r == id)
            .ok_or_else(|| Error::NotFound(format!("Rule {} not found", id)))?;
        ids.remove(current);
        ids.insert(index.min(ids.len()), id);

        for (position, rule_id) in ids.iter().enumerate() {
            tx.execute(
                "UPDATE category_rules SET position = ? WHERE id = ?",
                params![position as i64, rule_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}
