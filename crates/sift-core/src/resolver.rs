//! Deterministic category resolution
//!
//! Precedence: merchant override, then the first enabled rule (declared
//! order) whose pattern occurs in `merchant + " " + details`, ignoring case.
//! No match is a normal outcome. Nothing here writes or calls out.

use tracing::debug;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{CategoryRule, Suggestion};

pub struct CategoryResolver<'a> {
    db: &'a Database,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Suggest a category for a merchant and free-text details
    pub fn resolve(&self, merchant_norm: &str, details: &str) -> Result<Option<Suggestion>> {
        let merchant = merchant_norm.trim();
        let details = details.trim();

        if !merchant.is_empty() {
            if let Some(found) = self.db.get_override(merchant)? {
                let category = found.category_norm.trim();
                if !category.is_empty() {
                    debug!(merchant, category, "Override matched");
                    return Ok(Some(Suggestion::from_override(category)));
                }
            }
        }

        let rules = self.db.list_enabled_rules()?;
        if let Some(rule) = first_matching_rule(&rules, merchant, details) {
            debug!(merchant, pattern = %rule.pattern, category = %rule.category, "Rule matched");
            return Ok(Some(Suggestion::from_rule(rule)));
        }

        Ok(None)
    }

    /// Resolve using a stored transaction's effective merchant and details
    pub fn suggest_for_transaction(&self, id: i64) -> Result<Option<Suggestion>> {
        let tx = self
            .db
            .get_transaction(id)?
            .ok_or_else(|| Error::NotFound(format!("Transaction {} not found", id)))?;
        self.resolve(tx.effective_merchant(), &tx.details)
    }
}

/// First rule in slice order whose non-blank pattern occurs in the text
pub fn first_matching_rule<'r>(
    rules: &'r [CategoryRule],
    merchant: &str,
    details: &str,
) -> Option<&'r CategoryRule> {
    let text = format!("{} {}", merchant, details).to_lowercase();
    rules.iter().find(|rule| {
        let pattern = rule.pattern.trim().to_lowercase();
        !pattern.is_empty() && text.contains(&pattern)
    })
}
