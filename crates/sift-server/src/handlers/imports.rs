//! Statement import and import history handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, MAX_PAGE_LIMIT};
use sift_core::models::{ImportBatch, ImportSummary};
use sift_core::LedgerImporter;

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub file_name: String,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

/// POST /api/import - Import a statement CSV
///
/// Expects multipart form with:
/// - file: CSV file (required, size-limited)
pub async fn import_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    let max_size = state.config.max_upload_size;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "upload.csv".to_string());

        // Read in chunks so an oversized upload is refused without buffering it all
        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?
        {
            if data.len() + chunk.len() > max_size {
                return Err(AppError::payload_too_large(&format!(
                    "File too large. Maximum size is {} MB",
                    max_size / 1024 / 1024
                )));
            }
            data.extend_from_slice(&chunk);
        }

        upload = Some((file_name, data));
    }

    let (file_name, data) = upload.ok_or_else(|| AppError::bad_request("Missing file field"))?;

    let db = state.db.clone();
    let name = file_name.clone();
    let summary = tokio::task::spawn_blocking(move || {
        LedgerImporter::new(&db).import(data.as_slice(), &name)
    })
    .await?
    .map_err(AppError::from_core)?;

    info!(
        file = %file_name,
        inserted = summary.rows_inserted,
        skipped = summary.rows_skipped,
        "Statement uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(ImportResponse { file_name, summary }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ImportListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/imports - Import batches, newest first
pub async fn list_imports(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImportListQuery>,
) -> Result<Json<Vec<ImportBatch>>, AppError> {
    let limit = params.limit.max(1).min(MAX_PAGE_LIMIT);
    Ok(Json(state.db.list_imports(limit)?))
}

/// GET /api/imports/:id - One import batch
pub async fn get_import(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ImportBatch>, AppError> {
    let batch = state
        .db
        .get_import(id)?
        .ok_or_else(|| AppError::not_found(&format!("Import {} not found", id)))?;
    Ok(Json(batch))
}
