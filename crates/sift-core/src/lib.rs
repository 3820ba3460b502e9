//! Sift Core Library
//!
//! Card statement ingestion and category resolution:
//! - Encrypted SQLite storage and migrations
//! - Idempotent, atomic CSV import with row fingerprints
//! - Deterministic category resolution (merchant overrides, then ordered rules)
//! - Override learning from user edits
//! - Optional assistive classifier behind a bounded gateway

pub mod assist;
pub mod canonical;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod learner;
pub mod models;
pub mod resolver;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use assist::{
    AssistBackend, AssistClient, AssistGateway, CommandBackend, MockBackend, OllamaBackend,
};
pub use config::{AssistConfig, Config, ImportConfig};
pub use db::Database;
pub use error::{AssistFailure, Error, Result};
pub use import::LedgerImporter;
pub use learner::OverrideLearner;
pub use models::{
    CategoryRule, CategorySpend, Confidence, ImportBatch, ImportSummary, MerchantOverride,
    SpendingSummary, Suggestion, SuggestionSource, Transaction, TransactionEdit,
};
pub use resolver::CategoryResolver;
