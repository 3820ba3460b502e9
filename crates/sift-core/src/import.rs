//! Ledger importer for card statement CSV exports
//!
//! One call imports one file inside a single database transaction:
//! either every accepted row and the batch record are committed, or nothing is.
//!
//! Per-row outcomes:
//! - unparseable date or amount: skipped (rejected)
//! - fingerprint already in the ledger: skipped (duplicate)
//! - any other insert failure: the whole batch is rolled back

use std::io::Read;

use csv::ReaderBuilder;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::canonical::{canonicalize, HeaderIndex};
use crate::db::imports::{finalize_batch, insert_batch};
use crate::db::transactions::insert_canonical;
use crate::db::{is_unique_violation, Database};
use crate::error::{Error, Result};
use crate::models::{ImportSummary, CARD_CSV_SOURCE};

/// Imports statement files into the ledger
pub struct LedgerImporter<'a> {
    db: &'a Database,
}

impl<'a> LedgerImporter<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Import one CSV stream.
    ///
    /// Size limits are the caller's job; this reads the stream to the end.
    /// Every call records a new batch, even when all rows are duplicates.
    pub fn import<R: Read>(&self, reader: R, file_name: &str) -> Result<ImportSummary> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| Error::import(0, e.into()))?
            .clone();
        let index = HeaderIndex::from_headers(headers.iter());

        let mut conn = self.db.conn().map_err(|e| Error::import(0, e))?;
        let tx = conn.transaction().map_err(|e| Error::import(0, e.into()))?;

        let batch_id =
            insert_batch(&tx, CARD_CSV_SOURCE, file_name).map_err(|e| Error::import(0, e.into()))?;

        let mut summary = ImportSummary {
            batch_id,
            ..Default::default()
        };
        let mut digest = Sha256::new();

        for result in rdr.records() {
            let record = result.map_err(|e| Error::import(summary.rows_seen, e.into()))?;
            summary.rows_seen += 1;

            let row = match canonicalize(&index, &record) {
                Ok(row) => row,
                Err(rejection) => {
                    debug!(row = summary.rows_seen, %rejection, "Skipping unparseable row");
                    summary.rows_rejected += 1;
                    continue;
                }
            };

            digest.update(row.row_hash.as_bytes());

            match insert_canonical(&tx, batch_id, &row) {
                Ok(_) => summary.rows_inserted += 1,
                Err(e) if is_unique_violation(&e) => {
                    debug!(row = summary.rows_seen, hash = %row.row_hash, "Skipping duplicate row");
                    summary.rows_duplicate += 1;
                }
                Err(e) => return Err(Error::import(summary.rows_seen, e.into())),
            }
        }

        summary.rows_skipped = summary.rows_rejected + summary.rows_duplicate;
        summary.sha256 = hex::encode(digest.finalize());

        finalize_batch(
            &tx,
            batch_id,
            &summary.sha256,
            summary.rows_seen,
            summary.rows_inserted,
            summary.rows_skipped,
        )
        .map_err(|e| Error::import(summary.rows_seen, e.into()))?;

        tx.commit()
            .map_err(|e| Error::import(summary.rows_seen, e.into()))?;

        info!(
            batch_id,
            file = file_name,
            seen = summary.rows_seen,
            inserted = summary.rows_inserted,
            duplicates = summary.rows_duplicate,
            rejected = summary.rows_rejected,
            "Import committed"
        );

        Ok(summary)
    }
}
