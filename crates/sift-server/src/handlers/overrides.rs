//! Merchant override handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{AppError, AppState};
use sift_core::models::MerchantOverride;

/// GET /api/overrides - Learned merchant overrides
pub async fn list_overrides(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MerchantOverride>>, AppError> {
    Ok(Json(state.db.list_overrides()?))
}
