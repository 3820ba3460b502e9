//! Spending summary handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::{AppError, AppState};
use sift_core::models::month_start;
use sift_core::SpendingSummary;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// YYYY-MM-DD, defaults to the first of the current month
    pub since: Option<String>,
}

/// GET /api/summary - Income, expenses and spend by category
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<SpendingSummary>, AppError> {
    let since = match params.since.as_deref() {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::bad_request("Invalid 'since' date, expected YYYY-MM-DD"))?,
        None => month_start(Utc::now().date_naive()),
    };

    Ok(Json(state.db.spending_summary(since)?))
}
