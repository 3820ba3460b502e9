//! Assistive classification command

use anyhow::Result;
use sift_core::db::KNOWN_CATEGORY_LIMIT;
use sift_core::{AssistConfig, AssistGateway, Database, Error};

use super::transactions::print_suggestion;

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn ctrl_c_or_never() {
    wait_for_signal(tokio::signal::ctrl_c()).await
}

async fn wait_for_signal<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if signal.await.is_err() {
        std::future::pending::<()>().await
    }
}

/// Ask the configured classifier once. Ctrl+C abandons the call.
pub async fn cmd_assist(db: &Database, config: &AssistConfig, id: i64) -> Result<()> {
    let gateway = AssistGateway::from_config(config);
    if !gateway.is_enabled() {
        println!("Assistive classifier not configured.");
        println!("  Set SIFT_ASSIST_BACKEND=command (uses `codex exec`) or");
        println!("  SIFT_ASSIST_BACKEND=ollama with OLLAMA_HOST.");
        return Ok(());
    }

    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;
    let known = db.known_categories(KNOWN_CATEGORY_LIMIT)?;

    println!(
        "🤖 Asking classifier about {} (timeout {}s)...",
        tx.merchant_raw,
        gateway.timeout().as_secs()
    );

    let result = gateway
        .classify_with_cancel(
            &tx.merchant_raw,
            &tx.details,
            tx.amount_cents,
            &known,
            ctrl_c_or_never(),
        )
        .await;

    match result {
        Ok(suggestion) => {
            print_suggestion(Some(&suggestion));
            println!(
                "   Not saved. Accept with: sift edit {} --category \"{}\"",
                id, suggestion.category
            );
        }
        Err(Error::AssistUnavailable(failure)) => {
            println!("   No suggestion available: {}", failure);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
