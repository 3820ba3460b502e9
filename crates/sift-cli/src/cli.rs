//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sift - Import card statements and categorize spending
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Card statement ledger with deterministic categorization", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "sift.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SIFT_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Config file (defaults to $SIFT_CONFIG, then ~/.config/sift/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import a card statement CSV
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Browse the ledger
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Edit a transaction's category, merchant, or notes
    ///
    /// Setting a category records a merchant override, so future
    /// transactions from the same merchant get the same suggestion.
    Edit {
        /// Transaction ID
        id: i64,

        /// Normalized category
        #[arg(short, long)]
        category: Option<String>,

        /// Normalized merchant name (defaults to the current merchant)
        #[arg(short, long)]
        merchant: Option<String>,

        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Show the deterministic category suggestion for a transaction
    Suggest {
        /// Transaction ID
        id: i64,
    },

    /// Ask the assistive classifier for a category (never saved)
    Assist {
        /// Transaction ID
        id: i64,
    },

    /// Manage category rules
    Rules {
        #[command(subcommand)]
        action: Option<RulesAction>,
    },

    /// List learned merchant overrides
    Overrides,

    /// Income, expenses and spend by category
    Summary {
        /// Start date (YYYY-MM-DD), defaults to the first of this month
        #[arg(long)]
        since: Option<String>,
    },

    /// List import batches
    Imports {
        /// Number of batches to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Number of transactions to skip
        #[arg(long, default_value = "0")]
        offset: i64,
    },

    /// Show one transaction in full
    Show {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum RulesAction {
    /// List rules in evaluation order
    List,

    /// Append a rule: text containing PATTERN gets CATEGORY
    Add {
        /// Substring to look for (case-insensitive)
        pattern: String,
        /// Category to suggest
        category: String,
    },

    /// Enable a rule
    Enable {
        /// Rule ID
        id: i64,
    },

    /// Disable a rule without deleting it
    Disable {
        /// Rule ID
        id: i64,
    },

    /// Move a rule to a position in the evaluation order (0 = first)
    Move {
        /// Rule ID
        id: i64,
        /// Zero-based position
        position: usize,
    },

    /// Delete a rule
    Delete {
        /// Rule ID
        id: i64,
    },

    /// Show which rule would categorize some text
    Test {
        /// Merchant name or description to test
        text: String,
    },
}
