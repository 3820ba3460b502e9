//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sift_core::{AssistClient, LedgerImporter, MockBackend};
use std::time::Duration;
use tower::ServiceExt;

const STATEMENT: &str = "Date,Processed On,Amount,Account Number,Transaction Type,Transaction Details,Category,Merchant Name
07 Feb 26,08 Feb 26,-45.30,4321,Debit,Card purchase,,Corner Cafe
09 Feb 26,10 Feb 26,-61.02,4321,Debit,Fuel SHELL 0042,Transport,Shell
";

const BOUNDARY: &str = "sift-test-boundary";

fn setup_test_app() -> (Router, Database) {
    setup_with(AssistGateway::disabled(), ServerConfig::default())
}

fn setup_with(gateway: AssistGateway, config: ServerConfig) -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    (create_router(db.clone(), gateway, config), db)
}

fn seed(db: &Database) -> i64 {
    LedgerImporter::new(db)
        .import(STATEMENT.as_bytes(), "feb.csv")
        .unwrap();
    db.list_transactions(10, 0)
        .unwrap()
        .into_iter()
        .find(|t| t.merchant_raw == "Corner Cafe")
        .unwrap()
        .id
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_upload(file_name: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/import")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// ========== Health ==========

#[tokio::test]
async fn test_health() {
    let (app, _db) = setup_test_app();
    let response = app.oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["transactions"], 0);
    assert_eq!(json["assist_enabled"], false);
}

// ========== Import ==========

#[tokio::test]
async fn test_import_upload() {
    let (app, db) = setup_test_app();

    let response = app
        .clone()
        .oneshot(multipart_upload("feb.csv", STATEMENT.as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["file_name"], "feb.csv");
    assert_eq!(json["rows_seen"], 2);
    assert_eq!(json["rows_inserted"], 2);
    assert_eq!(db.count_transactions().unwrap(), 2);

    // Same file again is all duplicates
    let response = app
        .oneshot(multipart_upload("feb.csv", STATEMENT.as_bytes()))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["rows_inserted"], 0);
    assert_eq!(json["rows_duplicate"], 2);
    assert_eq!(db.count_transactions().unwrap(), 2);
}

#[tokio::test]
async fn test_import_storage_failure_reports_rows_seen() {
    let (app, db) = setup_test_app();
    db.conn()
        .unwrap()
        .execute_batch(
            r#"
            CREATE TRIGGER reject_fuel BEFORE INSERT ON transactions
            WHEN NEW.details = 'Fuel SHELL 0042'
            BEGIN
                SELECT RAISE(ABORT, 'rejected by trigger');
            END;
            "#,
        )
        .unwrap();

    let response = app
        .oneshot(multipart_upload("feb.csv", STATEMENT.as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = get_body_json(response).await;
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("after 2 rows"), "{message}");
    assert!(message.contains("nothing was saved"), "{message}");
    assert!(message.contains("database write failed"), "{message}");
    assert!(!message.contains("rejected by trigger"), "{message}");

    assert_eq!(db.count_transactions().unwrap(), 0);
    assert!(db.list_imports(10).unwrap().is_empty());
}

#[tokio::test]
async fn test_import_too_large() {
    let config = ServerConfig {
        max_upload_size: 64,
        ..Default::default()
    };
    let (app, db) = setup_with(AssistGateway::disabled(), config);

    let response = app
        .oneshot(multipart_upload("feb.csv", STATEMENT.as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(db.count_transactions().unwrap(), 0);
    assert!(db.list_imports(10).unwrap().is_empty());
}

#[tokio::test]
async fn test_import_missing_file_field() {
    let (app, _db) = setup_test_app();

    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/import")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Missing file field");
}

#[tokio::test]
async fn test_import_history() {
    let (app, db) = setup_test_app();
    seed(&db);
    let batch_id = db.list_imports(1).unwrap()[0].id;

    let response = app.clone().oneshot(get("/api/imports")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/imports/{}", batch_id)))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["rows_inserted"], 2);
    assert_eq!(json["source"], "cc_csv");

    let response = app.oneshot(get("/api/imports/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Transactions ==========

#[tokio::test]
async fn test_list_transactions_clamps_limit() {
    let (app, db) = setup_test_app();
    seed(&db);

    let response = app
        .oneshot(get("/api/transactions?limit=0&offset=-5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["limit"], 1);
    assert_eq!(json["offset"], 0);
    assert_eq!(json["total"], 2);
    assert_eq!(json["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_transaction_includes_suggestion() {
    let (app, db) = setup_test_app();
    let id = seed(&db);
    db.create_rule("cafe", "Dining").unwrap();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/transactions/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["merchant_raw"], "Corner Cafe");
    assert_eq!(json["amount_cents"], -4530);
    assert_eq!(json["txn_date"], "2026-02-07");
    assert_eq!(json["suggestion"]["category"], "Dining");
    assert_eq!(json["suggestion"]["source"], "rule");

    let response = app.oneshot(get("/api/transactions/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_transaction_learns_override() {
    let (app, db) = setup_test_app();
    let id = seed(&db);

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/transactions/{}", id),
            serde_json::json!({
                "category_norm": "Dining",
                "merchant_norm": "Corner Cafe",
                "notes": "coffee"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["override_learned"], true);
    assert_eq!(json["effective_category"], "Dining");
    assert_eq!(json["notes"], "coffee");
    assert_eq!(json["suggestion"]["source"], "override");

    let found = db.get_override("Corner Cafe").unwrap().unwrap();
    assert_eq!(found.category_norm, "Dining");
}

#[tokio::test]
async fn test_update_missing_transaction() {
    let (app, _db) = setup_test_app();
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/transactions/42",
            serde_json::json!({"category_norm": "Dining"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Assist ==========

#[tokio::test]
async fn test_assist_returns_suggestion() {
    let gateway = AssistGateway::new(AssistClient::mock(), Duration::from_secs(5));
    let (app, db) = setup_with(gateway, ServerConfig::default());
    let id = seed(&db);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/transactions/{}/assist", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["suggestion"]["category"], "Dining");
    assert_eq!(json["suggestion"]["source"], "assistive");
    assert!(json["unavailable"].is_null());
    assert!(db.list_overrides().unwrap().is_empty());
}

#[tokio::test]
async fn test_assist_timeout_degrades() {
    let gateway = AssistGateway::new(
        AssistClient::Mock(MockBackend::hanging()),
        Duration::from_millis(50),
    );
    let (app, db) = setup_with(gateway, ServerConfig::default());
    let id = seed(&db);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/transactions/{}/assist", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert!(json["suggestion"].is_null());
    assert!(json["unavailable"].as_str().unwrap().contains("no reply"));
}

#[tokio::test]
async fn test_assist_disabled_degrades() {
    let (app, db) = setup_test_app();
    let id = seed(&db);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/transactions/{}/assist", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!(json["suggestion"].is_null());
    assert!(json["unavailable"].is_string());
}

// ========== Rules ==========

#[tokio::test]
async fn test_rule_lifecycle() {
    let (app, _db) = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/rules",
            serde_json::json!({"pattern": "SHELL", "category": "Transport"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = get_body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/rules",
            serde_json::json!({"pattern": "FUEL", "category": "Fuel"}),
        ))
        .await
        .unwrap();
    let second = get_body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/rules/{}/move", second),
            serde_json::json!({"position": 0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order: Vec<i64> = get_body_json(response)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(order, vec![second, first]);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/rules/{}/enabled", first),
            serde_json::json!({"enabled": false}),
        ))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await["enabled"], false);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/rules/{}", first))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get("/api/rules")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_blank_rule_rejected() {
    let (app, _db) = setup_test_app();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/rules",
            serde_json::json!({"pattern": "  ", "category": "Transport"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_missing_rule() {
    let (app, _db) = setup_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/rules/77")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Summary ==========

#[tokio::test]
async fn test_summary_since_date() {
    let (app, db) = setup_test_app();
    seed(&db);

    let response = app
        .oneshot(get("/api/summary?since=2026-02-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["since"], "2026-02-01");
    assert_eq!(json["income_cents"], 0);
    assert_eq!(json["expense_cents"], 10632);
    assert_eq!(json["categories"][0]["category"], "Transport");
    assert_eq!(json["categories"][0]["spend_cents"], 6102);
    assert_eq!(json["categories"][1]["category"], "Uncategorised");
    assert_eq!(json["categories"][1]["spend_cents"], 4530);
}

#[tokio::test]
async fn test_summary_invalid_date() {
    let (app, _db) = setup_test_app();
    let response = app
        .oneshot(get("/api/summary?since=February"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Overrides ==========

#[tokio::test]
async fn test_list_overrides() {
    let (app, db) = setup_test_app();
    sift_core::OverrideLearner::new(&db)
        .learn("Corner Cafe", "Dining")
        .unwrap();

    let response = app.oneshot(get("/api/overrides")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json[0]["merchant_norm"], "Corner Cafe");
    assert_eq!(json[0]["category_norm"], "Dining");
}

// ========== Error mapping ==========

#[test]
fn test_internal_errors_are_sanitized() {
    let err = AppError::from(anyhow::anyhow!("disk on fire at /secret/path"));
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
