//! Import command implementations

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use sift_core::{Database, LedgerImporter};

use super::truncate;

pub fn cmd_import(db: &Database, file: &Path, max_bytes: u64) -> Result<()> {
    let size = std::fs::metadata(file)
        .with_context(|| format!("Failed to open file: {}", file.display()))?
        .len();
    if size > max_bytes {
        bail!(
            "File too large ({} bytes). Maximum size is {} MB",
            size,
            max_bytes / 1024 / 1024
        );
    }

    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    println!("📥 Importing {}...", file.display());

    let reader = BufReader::new(
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?,
    );
    let summary = LedgerImporter::new(db)
        .import(reader, &file_name)
        .context("Import failed, nothing was saved")?;

    println!("   Rows read: {}", summary.rows_seen);
    println!("   ✅ Imported: {}", summary.rows_inserted);
    if summary.rows_duplicate > 0 {
        println!("   ⏭️  Already in ledger: {}", summary.rows_duplicate);
    }
    if summary.rows_rejected > 0 {
        println!(
            "   ⚠️  Unreadable date or amount: {} (run with --verbose for details)",
            summary.rows_rejected
        );
    }
    println!("   Batch #{} ({})", summary.batch_id, &summary.sha256[..12.min(summary.sha256.len())]);

    Ok(())
}

pub fn cmd_imports_list(db: &Database, limit: i64) -> Result<()> {
    let batches = db.list_imports(limit)?;

    if batches.is_empty() {
        println!("No imports yet. Import a statement with:");
        println!("  sift import --file statement.csv");
        return Ok(());
    }

    println!();
    println!("📦 Import History");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:>4} │ {:19} │ {:>5} │ {:>5} │ {:>5} │ {}",
        "ID", "When", "Rows", "New", "Skip", "File"
    );

    for batch in batches {
        println!(
            "   {:>4} │ {:19} │ {:>5} │ {:>5} │ {:>5} │ {}",
            batch.id,
            batch.created_at.format("%Y-%m-%d %H:%M:%S"),
            batch.rows_total,
            batch.rows_inserted,
            batch.rows_skipped,
            truncate(&batch.file_name, 30)
        );
    }

    Ok(())
}
