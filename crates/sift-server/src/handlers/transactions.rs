//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AppError, AppState, MAX_PAGE_LIMIT};
use sift_core::models::{Suggestion, Transaction, TransactionEdit};
use sift_core::{CategoryResolver, Error, OverrideLearner};

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub transactions: Vec<Transaction>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// A transaction with its effective values and deterministic suggestion
#[derive(Serialize)]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub effective_category: String,
    pub effective_merchant: String,
    pub suggestion: Option<Suggestion>,
}

#[derive(Serialize)]
pub struct UpdateTransactionResponse {
    #[serde(flatten)]
    pub detail: TransactionDetail,
    /// Whether the edit was recorded as a merchant override
    pub override_learned: bool,
}

#[derive(Serialize)]
pub struct AssistResponse {
    pub transaction_id: i64,
    pub suggestion: Option<Suggestion>,
    /// Why no suggestion is available, when it isn't
    pub unavailable: Option<String>,
}

fn load_detail(state: &AppState, id: i64) -> Result<TransactionDetail, AppError> {
    let transaction = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::not_found(&format!("Transaction {} not found", id)))?;

    let suggestion = CategoryResolver::new(&state.db)
        .resolve(transaction.effective_merchant(), &transaction.details)?;

    Ok(TransactionDetail {
        effective_category: transaction.effective_category().to_string(),
        effective_merchant: transaction.effective_merchant().to_string(),
        transaction,
        suggestion,
    })
}

/// GET /api/transactions - List transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<TransactionResponse>, AppError> {
    // Input validation: clamp pagination parameters
    let limit = params.limit.max(1).min(MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    let transactions = state.db.list_transactions(limit, offset)?;
    let total = state.db.count_transactions()?;

    Ok(Json(TransactionResponse {
        transactions,
        total,
        limit,
        offset,
    }))
}

/// GET /api/transactions/:id - One transaction with its suggestion
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionDetail>, AppError> {
    Ok(Json(load_detail(&state, id)?))
}

/// PUT /api/transactions/:id - Edit normalized fields and learn from them
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(edit): Json<TransactionEdit>,
) -> Result<Json<UpdateTransactionResponse>, AppError> {
    let override_learned = OverrideLearner::new(&state.db)
        .apply_edit(id, &edit)
        .map_err(AppError::from_core)?;

    Ok(Json(UpdateTransactionResponse {
        detail: load_detail(&state, id)?,
        override_learned,
    }))
}

/// POST /api/transactions/:id/assist - Ask the assistive classifier
///
/// Classifier failures are not errors: the response carries no suggestion
/// and the reason instead.
pub async fn assist_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<AssistResponse>, AppError> {
    match state.gateway.classify_transaction(&state.db, id).await {
        Ok(suggestion) => Ok(Json(AssistResponse {
            transaction_id: id,
            suggestion: Some(suggestion),
            unavailable: None,
        })),
        Err(Error::AssistUnavailable(failure)) => {
            debug!(id, %failure, "No assistive suggestion");
            Ok(Json(AssistResponse {
                transaction_id: id,
                suggestion: None,
                unavailable: Some(failure.to_string()),
            }))
        }
        Err(e) => Err(AppError::from_core(e)),
    }
}
