//! Override command implementations

use anyhow::Result;
use sift_core::Database;

use super::truncate;

pub fn cmd_overrides_list(db: &Database) -> Result<()> {
    let overrides = db.list_overrides()?;

    if overrides.is_empty() {
        println!("No overrides learned yet. Set a category with:");
        println!("  sift edit <id> --category <category>");
        return Ok(());
    }

    println!();
    println!("🧠 Merchant Overrides");
    println!("   ─────────────────────────────────────────────────────────────");

    for o in overrides {
        println!(
            "   {:30} → {:20} ({})",
            truncate(&o.merchant_norm, 30),
            o.category_norm,
            o.updated_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}
