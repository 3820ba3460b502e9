//! Sift CLI - Card statement ledger
//!
//! Usage:
//!   sift init                 Initialize database
//!   sift import --file CSV    Import a statement (re-imports are skipped)
//!   sift suggest <id>         Show the category suggestion for a transaction
//!   sift summary              Month-to-date spend by category
//!   sift serve --port 3000    Start web server

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use sift_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(Some(path.as_path())),
        None => Config::load(),
    }
    .context("Failed to load config")?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Import { file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &file, config.import.max_import_bytes)
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&db, 20, 0),
                Some(TransactionsAction::List { limit, offset }) => {
                    commands::cmd_transactions_list(&db, limit, offset)
                }
                Some(TransactionsAction::Show { id }) => commands::cmd_transactions_show(&db, id),
            }
        }
        Commands::Edit {
            id,
            category,
            merchant,
            notes,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_edit(
                &db,
                id,
                category.as_deref(),
                merchant.as_deref(),
                notes.as_deref(),
            )
        }
        Commands::Suggest { id } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_suggest(&db, id)
        }
        Commands::Assist { id } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_assist(&db, &config.assist, id).await
        }
        Commands::Rules { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(RulesAction::List) => commands::cmd_rules_list(&db),
                Some(RulesAction::Add { pattern, category }) => {
                    commands::cmd_rules_add(&db, &pattern, &category)
                }
                Some(RulesAction::Enable { id }) => commands::cmd_rules_set_enabled(&db, id, true),
                Some(RulesAction::Disable { id }) => {
                    commands::cmd_rules_set_enabled(&db, id, false)
                }
                Some(RulesAction::Move { id, position }) => {
                    commands::cmd_rules_move(&db, id, position)
                }
                Some(RulesAction::Delete { id }) => commands::cmd_rules_delete(&db, id),
                Some(RulesAction::Test { text }) => commands::cmd_rules_test(&db, &text),
            }
        }
        Commands::Overrides => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_overrides_list(&db)
        }
        Commands::Summary { since } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_summary(&db, since.as_deref())
        }
        Commands::Imports { limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_imports_list(&db, limit)
        }
        Commands::Serve { port, host } => {
            commands::cmd_serve(&cli.db, &host, port, cli.no_encrypt, &config).await
        }
    }
}
