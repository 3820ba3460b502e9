//! Category rule handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use sift_core::models::CategoryRule;

#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    pub pattern: String,
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRuleRequest {
    /// Zero-based index in the declared order
    pub position: usize,
}

#[derive(Debug, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// GET /api/rules - All rules in declared order
pub async fn list_rules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryRule>>, AppError> {
    Ok(Json(state.db.list_rules()?))
}

/// POST /api/rules - Append a rule
pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<(StatusCode, Json<CategoryRule>), AppError> {
    let id = state
        .db
        .create_rule(&req.pattern, &req.category)
        .map_err(AppError::from_core)?;
    let rule = state
        .db
        .get_rule(id)?
        .ok_or_else(|| AppError::internal("Rule vanished after insert"))?;
    Ok((StatusCode::CREATED, Json(rule)))
}

/// DELETE /api/rules/:id
pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.db.delete_rule(id).map_err(AppError::from_core)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/rules/:id/move - Reorder; returns the new order
pub async fn move_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<MoveRuleRequest>,
) -> Result<Json<Vec<CategoryRule>>, AppError> {
    state
        .db
        .move_rule(id, req.position)
        .map_err(AppError::from_core)?;
    Ok(Json(state.db.list_rules()?))
}

/// POST /api/rules/:id/enabled
pub async fn set_rule_enabled(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<SetEnabledRequest>,
) -> Result<Json<CategoryRule>, AppError> {
    state
        .db
        .set_rule_enabled(id, req.enabled)
        .map_err(AppError::from_core)?;
    let rule = state
        .db
        .get_rule(id)?
        .ok_or_else(|| AppError::not_found(&format!("Rule {} not found", id)))?;
    Ok(Json(rule))
}
