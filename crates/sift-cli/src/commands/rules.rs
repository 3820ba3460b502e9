//! Rule command implementations

use anyhow::Result;
use sift_core::resolver::first_matching_rule;
use sift_core::Database;

use super::truncate;

pub fn cmd_rules_list(db: &Database) -> Result<()> {
    let rules = db.list_rules()?;

    if rules.is_empty() {
        println!("No rules defined. Add one with:");
        println!("  sift rules add <pattern> <category>");
        return Ok(());
    }

    println!();
    println!("📋 Category Rules (first match wins)");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:>3} │ {:>4} │ {:3} │ {:30} │ {}",
        "#", "ID", "On", "Contains", "Category"
    );
    println!("   ────┼──────┼─────┼────────────────────────────────┼──────────────");

    for (index, rule) in rules.iter().enumerate() {
        println!(
            "   {:>3} │ {:>4} │ {:3} │ {:30} │ {}",
            index,
            rule.id,
            if rule.enabled { "yes" } else { "no" },
            truncate(&rule.pattern, 30),
            rule.category
        );
    }

    Ok(())
}

pub fn cmd_rules_add(db: &Database, pattern: &str, category: &str) -> Result<()> {
    let id = db.create_rule(pattern, category)?;
    println!(
        "✅ Created rule #{}: contains \"{}\" → {}",
        id,
        pattern.trim(),
        category.trim()
    );
    Ok(())
}

pub fn cmd_rules_set_enabled(db: &Database, id: i64, enabled: bool) -> Result<()> {
    db.set_rule_enabled(id, enabled)?;
    println!(
        "✅ Rule #{} {}",
        id,
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

pub fn cmd_rules_move(db: &Database, id: i64, position: usize) -> Result<()> {
    db.move_rule(id, position)?;
    println!("✅ Moved rule #{}", id);
    cmd_rules_list(db)
}

pub fn cmd_rules_delete(db: &Database, id: i64) -> Result<()> {
    db.delete_rule(id)?;
    println!("✅ Deleted rule #{}", id);
    Ok(())
}

pub fn cmd_rules_test(db: &Database, text: &str) -> Result<()> {
    let rules = db.list_enabled_rules()?;

    match first_matching_rule(&rules, text, "") {
        Some(rule) => println!(
            "🔍 \"{}\" → {} (rule #{}, contains \"{}\")",
            text, rule.category, rule.id, rule.pattern
        ),
        None => println!("No enabled rule matches \"{}\"", text),
    }

    Ok(())
}
