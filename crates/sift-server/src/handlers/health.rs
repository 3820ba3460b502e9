//! Health handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use sift_core::AssistBackend;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub transactions: i64,
    pub assist_enabled: bool,
    pub assist_backend: Option<String>,
}

/// GET /api/health - Liveness plus a cheap database check
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    let transactions = state.db.count_transactions()?;

    Ok(Json(HealthResponse {
        status: "ok",
        transactions,
        assist_enabled: state.gateway.is_enabled(),
        assist_backend: state.gateway.client().map(|c| c.name().to_string()),
    }))
}
