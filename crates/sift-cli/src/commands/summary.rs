//! Spending summary command

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use sift_core::models::{format_cents, month_start};
use sift_core::Database;

use super::truncate;

pub fn cmd_summary(db: &Database, since: Option<&str>) -> Result<()> {
    let since = match since {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))?,
        None => month_start(Utc::now().date_naive()),
    };

    let summary = db.spending_summary(since)?;

    println!();
    println!("📊 Spending since {}", summary.since);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Income:   {:>12}", format_cents(summary.income_cents));
    println!("   Expenses: {:>12}", format_cents(summary.expense_cents));

    if summary.categories.is_empty() {
        println!();
        println!("   No spending in this period.");
        return Ok(());
    }

    println!();
    for c in &summary.categories {
        let share = if summary.expense_cents > 0 {
            c.spend_cents as f64 / summary.expense_cents as f64 * 100.0
        } else {
            0.0
        };
        println!(
            "   {:24} {:>12} {:>5.1}%  ({} txns)",
            truncate(&c.category, 24),
            format_cents(c.spend_cents),
            share,
            c.transaction_count
        );
    }

    Ok(())
}
