//! Domain models for sift

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Source label recorded on every batch read from a card statement CSV
pub const CARD_CSV_SOURCE: &str = "cc_csv";

/// A transaction in the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Batch that inserted this row
    pub import_id: i64,
    pub txn_date: NaiveDate,
    /// Processed-on date as printed on the statement
    pub processed_on: String,
    /// Minor currency units. Negative = outflow
    pub amount_cents: i64,
    pub account: String,
    pub txn_type: String,
    pub details: String,
    pub category_raw: String,
    pub merchant_raw: String,
    /// User-assigned category, empty until edited
    pub category_norm: String,
    /// User-assigned merchant, empty until edited
    pub merchant_norm: String,
    pub notes: String,
    /// Content fingerprint used for deduplication
    pub row_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Normalized category if set, otherwise the statement's category
    pub fn effective_category(&self) -> &str {
        if self.category_norm.is_empty() {
            &self.category_raw
        } else {
            &self.category_norm
        }
    }

    /// Normalized merchant if set, otherwise the statement's merchant
    pub fn effective_merchant(&self) -> &str {
        if self.merchant_norm.is_empty() {
            &self.merchant_raw
        } else {
            &self.merchant_norm
        }
    }
}

/// User edit of the mutable transaction fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionEdit {
    #[serde(default)]
    pub category_norm: String,
    #[serde(default)]
    pub merchant_norm: String,
    #[serde(default)]
    pub notes: String,
}

/// One execution of the importer over one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub id: i64,
    pub source: String,
    pub file_name: String,
    /// Digest over every row fingerprint seen, in file order
    pub sha256: String,
    pub rows_total: i64,
    pub rows_inserted: i64,
    pub rows_skipped: i64,
    pub created_at: DateTime<Utc>,
}

/// Result of importing one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub batch_id: i64,
    pub rows_seen: usize,
    pub rows_inserted: usize,
    /// Rejected + duplicate rows
    pub rows_skipped: usize,
    /// Rows whose date or amount could not be parsed
    pub rows_rejected: usize,
    /// Rows whose fingerprint was already in the ledger
    pub rows_duplicate: usize,
    pub sha256: String,
}

/// Persisted merchant → category mapping learned from a manual edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantOverride {
    pub merchant_norm: String,
    pub category_norm: String,
    pub updated_at: DateTime<Utc>,
}

/// Substring rule mapping text to a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub id: i64,
    /// Case-insensitive substring to look for
    pub pattern: String,
    pub category: String,
    pub enabled: bool,
    /// Declared order. Lower positions are evaluated first
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

/// Where a suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    /// Learned merchant override
    Override,
    /// First matching category rule
    Rule,
    /// External classifier, only on request
    Assistive,
}

impl SuggestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Rule => "rule",
            Self::Assistive => "assistive",
        }
    }
}

impl std::str::FromStr for SuggestionSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "override" => Ok(Self::Override),
            "rule" => Ok(Self::Rule),
            "assistive" | "llm" => Ok(Self::Assistive),
            _ => Err(format!("Unknown suggestion source: {}", s)),
        }
    }
}

impl std::fmt::Display for SuggestionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifier self-reported confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    #[serde(rename = "med", alias = "medium")]
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "med",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "med" | "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown confidence: {}", s)),
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A proposed category for a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: String,
    pub reason: String,
    pub source: SuggestionSource,
    /// Only set for assistive suggestions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl Suggestion {
    pub fn from_override(category: &str) -> Self {
        Self {
            category: category.to_string(),
            reason: "merchant override".to_string(),
            source: SuggestionSource::Override,
            confidence: None,
        }
    }

    pub fn from_rule(rule: &CategoryRule) -> Self {
        Self {
            category: rule.category.clone(),
            reason: format!("rule contains: {}", rule.pattern),
            source: SuggestionSource::Rule,
            confidence: None,
        }
    }
}

/// Label used for spend with neither a normalized nor a statement category
pub const UNCATEGORISED: &str = "Uncategorised";

/// Spend attributed to one effective category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: String,
    /// Positive minor units
    pub spend_cents: i64,
    pub transaction_count: i64,
}

/// Income, expense and per-category spend from a start date onward
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub since: NaiveDate,
    pub income_cents: i64,
    /// Positive minor units
    pub expense_cents: i64,
    /// Largest spend first
    pub categories: Vec<CategorySpend>,
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Format minor units as a signed dollar string, e.g. `-$45.30`
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}
