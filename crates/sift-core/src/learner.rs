//! Override learner
//!
//! Turns manual corrections into merchant overrides so the resolver
//! short-circuits for that merchant next time. This is the only code that
//! writes `merchant_category_overrides`.

use rusqlite::Connection;
use tracing::info;

use crate::db::overrides::upsert_override;
use crate::db::transactions::update_editable_fields;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::TransactionEdit;

pub struct OverrideLearner<'a> {
    db: &'a Database,
}

impl<'a> OverrideLearner<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record `merchant → category`, replacing any earlier category.
    ///
    /// Returns false without writing when either side is blank.
    pub fn learn(&self, merchant_norm: &str, category_norm: &str) -> Result<bool> {
        let conn = self.db.conn()?;
        Ok(learn_on(&conn, merchant_norm, category_norm)?)
    }

    /// Apply a user edit to a transaction and learn from it in one
    /// transaction. Returns whether an override was recorded.
    pub fn apply_edit(&self, transaction_id: i64, edit: &TransactionEdit) -> Result<bool> {
        let category = edit.category_norm.trim();
        let merchant = edit.merchant_norm.trim();
        let notes = edit.notes.trim();

        let mut conn = self.db.conn()?;
        let tx = conn.transaction()?;

        if !update_editable_fields(&tx, transaction_id, category, merchant, notes)? {
            return Err(Error::NotFound(format!(
                "Transaction {} not found",
                transaction_id
            )));
        }
        let learned = learn_on(&tx, merchant, category)?;

        tx.commit()?;
        Ok(learned)
    }
}

fn learn_on(conn: &Connection, merchant_norm: &str, category_norm: &str) -> rusqlite::Result<bool> {
    let merchant = merchant_norm.trim();
    let category = category_norm.trim();
    if merchant.is_empty() || category.is_empty() {
        return Ok(false);
    }

    upsert_override(conn, merchant, category)?;
    info!(merchant, category, "Learned merchant override");
    Ok(true)
}
