//! Transaction command implementations

use anyhow::{Context, Result};
use sift_core::models::{format_cents, Suggestion, TransactionEdit};
use sift_core::{CategoryResolver, Database, OverrideLearner};

use super::truncate;

fn colored_amount(cents: i64) -> String {
    if cents < 0 {
        format!("\x1b[31m{}\x1b[0m", format_cents(cents)) // Red for spending
    } else {
        format!("\x1b[32m+{}\x1b[0m", format_cents(cents)) // Green for credits
    }
}

pub(crate) fn print_suggestion(suggestion: Option<&Suggestion>) {
    match suggestion {
        Some(s) => {
            print!("   💡 Suggested: {} ({}", s.category, s.source);
            if let Some(confidence) = s.confidence {
                print!(", {} confidence", confidence);
            }
            println!(")");
            if !s.reason.is_empty() {
                println!("      {}", s.reason);
            }
        }
        None => println!("   No suggestion available"),
    }
}

pub fn cmd_transactions_list(db: &Database, limit: i64, offset: i64) -> Result<()> {
    let transactions = db.list_transactions(limit, offset)?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  sift import --file statement.csv");
        return Ok(());
    }

    let total = db.count_transactions()?;

    println!();
    println!("📝 Transactions ({} total)", total);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let category = tx.effective_category();
        println!(
            "   [{:>4}] {} │ {:>12} │ {:30} │ {}",
            tx.id,
            tx.txn_date,
            colored_amount(tx.amount_cents),
            truncate(tx.effective_merchant(), 30),
            if category.is_empty() { "-" } else { category }
        );
    }

    Ok(())
}

pub fn cmd_transactions_show(db: &Database, id: i64) -> Result<()> {
    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    println!();
    println!("🧾 Transaction #{}", tx.id);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Date:         {}", tx.txn_date);
    if !tx.processed_on.is_empty() {
        println!("   Processed on: {}", tx.processed_on);
    }
    println!("   Amount:       {}", colored_amount(tx.amount_cents));
    println!("   Account:      {}", tx.account);
    println!("   Type:         {}", tx.txn_type);
    println!("   Details:      {}", tx.details);
    println!("   Merchant:     {} (raw: {})", tx.effective_merchant(), tx.merchant_raw);
    println!("   Category:     {} (raw: {})", tx.effective_category(), tx.category_raw);
    if !tx.notes.is_empty() {
        println!("   Notes:        {}", tx.notes);
    }
    println!("   Import batch: #{}", tx.import_id);

    let suggestion = CategoryResolver::new(db).resolve(tx.effective_merchant(), &tx.details)?;
    println!();
    print_suggestion(suggestion.as_ref());

    Ok(())
}

/// Apply an edit. Omitted fields keep their current value; the merchant
/// falls back to the effective merchant so a category-only edit still
/// teaches an override.
pub fn cmd_edit(
    db: &Database,
    id: i64,
    category: Option<&str>,
    merchant: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    let edit = TransactionEdit {
        category_norm: category.unwrap_or(&tx.category_norm).to_string(),
        merchant_norm: merchant.unwrap_or(tx.effective_merchant()).to_string(),
        notes: notes.unwrap_or(&tx.notes).to_string(),
    };

    let learned = OverrideLearner::new(db)
        .apply_edit(id, &edit)
        .with_context(|| format!("Failed to update transaction {}", id))?;

    println!("✅ Updated transaction #{}", id);
    if learned {
        println!(
            "   🧠 Learned: {} → {}",
            edit.merchant_norm.trim(),
            edit.category_norm.trim()
        );
    }

    Ok(())
}

pub fn cmd_suggest(db: &Database, id: i64) -> Result<()> {
    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    println!(
        "🔍 #{} {} │ {} │ {}",
        tx.id,
        tx.txn_date,
        format_cents(tx.amount_cents),
        tx.effective_merchant()
    );

    let suggestion = CategoryResolver::new(db).suggest_for_transaction(id)?;
    print_suggestion(suggestion.as_ref());
    if suggestion.is_none() {
        println!("   Try: sift assist {}", id);
    }

    Ok(())
}
