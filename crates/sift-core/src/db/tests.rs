//! Database tests

use super::*;
use crate::import::LedgerImporter;
use crate::learner::OverrideLearner;
use crate::models::TransactionEdit;

const HEADER: &str =
    "Date,Processed On,Amount,Account Number,Transaction Type,Transaction Details,Category,Merchant Name\n";

fn seed(db: &Database, rows: &str) -> i64 {
    let csv = format!("{}{}", HEADER, rows);
    LedgerImporter::new(db)
        .import(csv.as_bytes(), "statement.csv")
        .unwrap()
        .batch_id
}

#[test]
fn test_in_memory_db_is_empty() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.count_transactions().unwrap(), 0);
    assert!(db.list_rules().unwrap().is_empty());
    assert!(db.list_overrides().unwrap().is_empty());
    assert!(db.list_imports(10).unwrap().is_empty());
}

#[test]
fn test_schema_columns() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('transactions') WHERE name IN \
             ('txn_date', 'amount_cents', 'merchant_raw', 'merchant_norm', 'category_norm', 'notes', 'row_hash')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 7);

    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('category_rules') WHERE name IN \
             ('match_contains', 'category_norm', 'enabled', 'position')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 4);
}

#[test]
fn test_migrations_are_rerunnable() {
    let db = Database::in_memory().unwrap();
    seed(&db, "07 Feb 26,,-45.30,1234,Debit,CORNER CAFE,,CORNER CAFE\n");

    let reopened = Database::new_unencrypted(db.path()).unwrap();
    assert_eq!(reopened.count_transactions().unwrap(), 1);
}

#[test]
fn test_encrypted_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    let path = path.to_string_lossy();

    {
        let db = Database::new_with_key(&path, Some("correct horse")).unwrap();
        db.create_rule("SHELL", "Transport").unwrap();
    }

    let db = Database::new_with_key(&path, Some("correct horse")).unwrap();
    assert_eq!(db.list_rules().unwrap().len(), 1);

    assert!(Database::new_with_key(&path, Some("wrong")).is_err());
}

#[test]
fn test_transaction_fields_roundtrip() {
    let db = Database::in_memory().unwrap();
    let batch = seed(
        &db,
        "07 Feb 26,08 Feb 26,-45.30,1234,Debit,Card purchase,Food,CORNER CAFE\n",
    );

    let txs = db.list_transactions_for_import(batch).unwrap();
    assert_eq!(txs.len(), 1);
    let tx = db.get_transaction(txs[0].id).unwrap().unwrap();

    assert_eq!(tx.import_id, batch);
    assert_eq!(tx.txn_date, chrono::NaiveDate::from_ymd_opt(2026, 2, 7).unwrap());
    assert_eq!(tx.processed_on, "08 Feb 26");
    assert_eq!(tx.amount_cents, -4530);
    assert_eq!(tx.account, "1234");
    assert_eq!(tx.txn_type, "Debit");
    assert_eq!(tx.details, "Card purchase");
    assert_eq!(tx.category_raw, "Food");
    assert_eq!(tx.merchant_raw, "CORNER CAFE");
    assert_eq!(tx.category_norm, "");
    assert_eq!(tx.merchant_norm, "");
    assert_eq!(tx.notes, "");
    assert_eq!(tx.row_hash.len(), 64);
}

#[test]
fn test_get_missing_transaction() {
    let db = Database::in_memory().unwrap();
    assert!(db.get_transaction(42).unwrap().is_none());
}

#[test]
fn test_list_transactions_newest_first() {
    let db = Database::in_memory().unwrap();
    seed(
        &db,
        "01 Jan 26,,-1.00,1,Debit,a,,A\n\
         15 Mar 26,,-2.00,1,Debit,b,,B\n\
         10 Feb 26,,-3.00,1,Debit,c,,C\n",
    );

    let txs = db.list_transactions(10, 0).unwrap();
    let merchants: Vec<&str> = txs.iter().map(|t| t.merchant_raw.as_str()).collect();
    assert_eq!(merchants, vec!["B", "C", "A"]);

    let page = db.list_transactions(1, 1).unwrap();
    assert_eq!(page[0].merchant_raw, "C");
}

#[test]
fn test_known_categories_use_effective_value() {
    let db = Database::in_memory().unwrap();
    seed(
        &db,
        "01 Jan 26,,-1.00,1,Debit,a,Food,A\n\
         02 Jan 26,,-2.00,1,Debit,b,,B\n\
         03 Jan 26,,-3.00,1,Debit,c,Food,C\n",
    );

    let b = db
        .list_transactions(10, 0)
        .unwrap()
        .into_iter()
        .find(|t| t.merchant_raw == "B")
        .unwrap();
    OverrideLearner::new(&db)
        .apply_edit(
            b.id,
            &TransactionEdit {
                category_norm: "Travel".into(),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(db.known_categories(KNOWN_CATEGORY_LIMIT).unwrap(), vec!["Food", "Travel"]);
    assert_eq!(db.known_categories(1).unwrap(), vec!["Food"]);
}

#[test]
fn test_import_batches_listed_newest_first() {
    let db = Database::in_memory().unwrap();
    let first = seed(&db, "01 Jan 26,,-1.00,1,Debit,a,,A\n");
    let second = seed(&db, "01 Jan 26,,-1.00,1,Debit,a,,A\n");

    let batches = db.list_imports(10).unwrap();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].id, second);
    assert_eq!(batches[1].id, first);
    assert_eq!(batches[0].rows_inserted, 0);
    assert_eq!(batches[0].rows_skipped, 1);

    let got = db.get_import(first).unwrap().unwrap();
    assert_eq!(got.file_name, "statement.csv");
    assert_eq!(got.rows_total, 1);
    assert!(db.get_import(999).unwrap().is_none());
}

#[test]
fn test_rule_crud() {
    let db = Database::in_memory().unwrap();

    let id = db.create_rule("  SHELL ", " Transport ").unwrap();
    let rule = db.get_rule(id).unwrap().unwrap();
    assert_eq!(rule.pattern, "SHELL");
    assert_eq!(rule.category, "Transport");
    assert!(rule.enabled);

    db.set_rule_enabled(id, false).unwrap();
    assert!(!db.get_rule(id).unwrap().unwrap().enabled);
    assert!(db.list_enabled_rules().unwrap().is_empty());
    assert_eq!(db.list_rules().unwrap().len(), 1);

    db.delete_rule(id).unwrap();
    assert!(db.get_rule(id).unwrap().is_none());
}

#[test]
fn test_rule_validation_and_not_found() {
    let db = Database::in_memory().unwrap();

    assert!(matches!(db.create_rule("  ", "X"), Err(Error::InvalidData(_))));
    assert!(matches!(db.create_rule("X", ""), Err(Error::InvalidData(_))));
    assert!(matches!(db.set_rule_enabled(9, true), Err(Error::NotFound(_))));
    assert!(matches!(db.delete_rule(9), Err(Error::NotFound(_))));
    assert!(matches!(db.move_rule(9, 0), Err(Error::NotFound(_))));
}

#[test]
fn test_rules_keep_declared_order() {
    let db = Database::in_memory().unwrap();
    let a = db.create_rule("A", "1").unwrap();
    let b = db.create_rule("B", "2").unwrap();
    let c = db.create_rule("C", "3").unwrap();

    let ids = |db: &Database| db.list_rules().unwrap().iter().map(|r| r.id).collect::<Vec<_>>();
    assert_eq!(ids(&db), vec![a, b, c]);

    db.move_rule(c, 0).unwrap();
    assert_eq!(ids(&db), vec![c, a, b]);

    db.move_rule(c, 99).unwrap();
    assert_eq!(ids(&db), vec![a, b, c]);

    db.move_rule(a, 1).unwrap();
    assert_eq!(ids(&db), vec![b, a, c]);

    let positions: Vec<i64> = db.list_rules().unwrap().iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);

    // Appends after a move still land last
    let d = db.create_rule("D", "4").unwrap();
    assert_eq!(ids(&db), vec![b, a, c, d]);
}

#[test]
fn test_override_upsert_replaces() {
    let db = Database::in_memory().unwrap();
    let learner = OverrideLearner::new(&db);

    assert!(learner.learn("CORNER CAFE", "Dining").unwrap());
    assert!(learner.learn("CORNER CAFE", "Coffee").unwrap());

    let overrides = db.list_overrides().unwrap();
    assert_eq!(overrides.len(), 1);
    assert_eq!(overrides[0].category_norm, "Coffee");
    assert_eq!(
        db.get_override("CORNER CAFE").unwrap().unwrap().category_norm,
        "Coffee"
    );
    assert!(db.get_override("corner cafe").unwrap().is_none());
}

#[test]
fn test_unique_violation_detection() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();
    conn.execute("INSERT INTO imports (source, file_name) VALUES ('cc_csv', 'a.csv')", [])
        .unwrap();

    let insert = "INSERT INTO transactions (import_id, txn_date, amount_cents, row_hash) \
                  VALUES (1, '2026-02-07', -4530, 'abc')";
    conn.execute(insert, []).unwrap();
    let dup = conn.execute(insert, []).unwrap_err();
    assert!(is_unique_violation(&dup));

    let not_null = conn
        .execute(
            "INSERT INTO transactions (import_id, txn_date, row_hash) VALUES (1, '2026-02-07', 'def')",
            [],
        )
        .unwrap_err();
    assert!(!is_unique_violation(&not_null));
}

fn date(s: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_spending_by_effective_category() {
    let db = Database::in_memory().unwrap();
    seed(
        &db,
        "28 Jan 26,29 Jan 26,-99.00,1234,Purchase,LAST MONTH,Dining,Old Bistro\n\
         02 Feb 26,03 Feb 26,-45.30,1234,Purchase,CORNER CAFE,Restaurants,Corner Cafe\n\
         05 Feb 26,06 Feb 26,-10.00,1234,Purchase,KIOSK,,Kiosk\n\
         07 Feb 26,08 Feb 26,-61.02,1234,Purchase,SHELL 0042,Transport,Shell\n\
         09 Feb 26,10 Feb 26,2500.00,1234,Credit,PAYROLL,Income,Employer\n",
    );

    let cafe = db
        .list_transactions(10, 0)
        .unwrap()
        .into_iter()
        .find(|t| t.merchant_raw == "Corner Cafe")
        .unwrap();
    let edit = TransactionEdit {
        category_norm: "Coffee".into(),
        merchant_norm: "Corner Cafe".into(),
        notes: String::new(),
    };
    OverrideLearner::new(&db).apply_edit(cafe.id, &edit).unwrap();

    let spend = db.spending_by_category(date("2026-02-01")).unwrap();
    let pairs: Vec<(&str, i64)> = spend
        .iter()
        .map(|c| (c.category.as_str(), c.spend_cents))
        .collect();
    assert_eq!(
        pairs,
        vec![("Transport", 6102), ("Coffee", 4530), ("Uncategorised", 1000)]
    );
    assert!(spend.iter().all(|c| c.transaction_count == 1));
}

#[test]
fn test_income_and_expense_totals() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.income_and_expense(date("2026-02-01")).unwrap(), (0, 0));

    seed(
        &db,
        "28 Jan 26,29 Jan 26,-99.00,1234,Purchase,LAST MONTH,Dining,Old Bistro\n\
         02 Feb 26,03 Feb 26,-45.30,1234,Purchase,CORNER CAFE,Restaurants,Corner Cafe\n\
         09 Feb 26,10 Feb 26,2500.00,1234,Credit,PAYROLL,Income,Employer\n",
    );

    assert_eq!(
        db.income_and_expense(date("2026-02-01")).unwrap(),
        (250000, 4530)
    );

    let summary = db.spending_summary(date("2026-01-01")).unwrap();
    assert_eq!(summary.income_cents, 250000);
    assert_eq!(summary.expense_cents, 14430);
    assert_eq!(summary.categories.len(), 2);
    assert_eq!(summary.categories[0].category, "Dining");
}
