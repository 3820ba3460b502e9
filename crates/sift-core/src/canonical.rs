//! Row canonicalization for card statement exports
//!
//! Turns one raw CSV record into typed, trimmed fields plus a content
//! fingerprint. Columns are looked up by header name, case-insensitively,
//! so column order and extra columns in the export do not matter.
//!
//! Known columns: Date, Amount, Account Number, Transaction Type,
//! Transaction Details, Category, Merchant Name, Processed On.

use std::collections::HashMap;

use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Statement date layout, e.g. `07 Feb 26`
pub const STATEMENT_DATE_FORMAT: &str = "%d %b %y";

pub mod columns {
    pub const DATE: &str = "date";
    pub const AMOUNT: &str = "amount";
    pub const ACCOUNT: &str = "account number";
    pub const TXN_TYPE: &str = "transaction type";
    pub const DETAILS: &str = "transaction details";
    pub const CATEGORY: &str = "category";
    pub const MERCHANT: &str = "merchant name";
    pub const PROCESSED_ON: &str = "processed on";
}

/// Header name → column index, keyed by lowercased trimmed name
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Build from a header row. Blank names are ignored; a repeated name
    /// points at its last occurrence.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut columns = HashMap::new();
        for (i, header) in headers.into_iter().enumerate() {
            let key = header.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            columns.insert(key, i);
        }
        Self { columns }
    }

    /// Trimmed value of `name` in `record`, or "" if the column is absent
    /// or the row is short
    pub fn get<'r>(&self, record: &'r StringRecord, name: &str) -> &'r str {
        self.columns
            .get(&name.trim().to_lowercase())
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(&name.trim().to_lowercase())
    }
}

/// Why a record was left out of the ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    #[error("invalid date {0:?}")]
    InvalidDate(String),

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
}

/// A statement row ready for insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRow {
    pub txn_date: NaiveDate,
    pub processed_on: String,
    pub amount_cents: i64,
    pub account: String,
    pub txn_type: String,
    pub details: String,
    pub category_raw: String,
    pub merchant_raw: String,
    pub row_hash: String,
}

/// Parse a statement date (`DD Mon YY`)
pub fn parse_statement_date(s: &str) -> Result<NaiveDate, RowRejection> {
    let s = s.trim();
    if s.is_empty() {
        return Err(RowRejection::InvalidDate(String::new()));
    }
    NaiveDate::parse_from_str(s, STATEMENT_DATE_FORMAT)
        .map_err(|_| RowRejection::InvalidDate(s.to_string()))
}

/// Convert a whole-currency decimal string to minor units.
///
/// The fractional remainder is truncated toward zero, not rounded.
/// Stored fingerprints depend on this.
pub fn parse_amount_cents(s: &str) -> Result<i64, RowRejection> {
    let s = s.trim();
    let value: f64 = s
        .parse()
        .map_err(|_| RowRejection::InvalidAmount(s.to_string()))?;
    if !value.is_finite() {
        return Err(RowRejection::InvalidAmount(s.to_string()));
    }
    Ok((value * 100.0) as i64)
}

/// Content fingerprint over the immutable source fields.
///
/// Normalized fields and notes never take part, so user edits do not
/// change a row's identity.
#[allow(clippy::too_many_arguments)]
pub fn fingerprint(
    txn_date: NaiveDate,
    processed_on: &str,
    amount_cents: i64,
    account: &str,
    txn_type: &str,
    details: &str,
    category_raw: &str,
    merchant_raw: &str,
) -> String {
    let material = [
        format!("date={}", txn_date.format("%Y-%m-%d")),
        format!("processed={}", processed_on),
        format!("amount_cents={}", amount_cents),
        format!("acct={}", account),
        format!("type={}", txn_type),
        format!("details={}", details),
        format!("cat={}", category_raw),
        format!("merchant={}", merchant_raw),
    ]
    .join("\n");

    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    hex::encode(hasher.finalize())
}

/// Canonicalize one record
pub fn canonicalize(
    index: &HeaderIndex,
    record: &StringRecord,
) -> Result<CanonicalRow, RowRejection> {
    let txn_date = parse_statement_date(index.get(record, columns::DATE))?;
    let amount_cents = parse_amount_cents(index.get(record, columns::AMOUNT))?;

    let processed_on = index.get(record, columns::PROCESSED_ON).to_string();
    let account = index.get(record, columns::ACCOUNT).to_string();
    let txn_type = index.get(record, columns::TXN_TYPE).to_string();
    let details = index.get(record, columns::DETAILS).to_string();
    let category_raw = index.get(record, columns::CATEGORY).to_string();
    let merchant_raw = index.get(record, columns::MERCHANT).to_string();

    let row_hash = fingerprint(
        txn_date,
        &processed_on,
        amount_cents,
        &account,
        &txn_type,
        &details,
        &category_raw,
        &merchant_raw,
    );

    Ok(CanonicalRow {
        txn_date,
        processed_on,
        amount_cents,
        account,
        txn_type,
        details,
        category_raw,
        merchant_raw,
        row_hash,
    })
}
