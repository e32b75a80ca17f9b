//! Credit API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::CreditStatus;
use shared::response::{CreditItem, SettleCreditResponse, UpdatedAttributes};

use crate::core::ServerState;
use crate::utils::validation::parse_order_key;
use crate::utils::{AppError, AppResult};

/// GET /api/credits
pub async fn list_outstanding(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<CreditItem>>> {
    let orders = state
        .store
        .query_credit(CreditStatus::Outstanding, true)
        .await?;
    Ok(Json(orders.iter().map(CreditItem::from).collect()))
}

/// PUT /api/credits/{order_date}/{number}
pub async fn settle(
    State(state): State<ServerState>,
    Path((order_date, number)): Path<(String, String)>,
) -> AppResult<Json<SettleCreditResponse>> {
    let key = parse_order_key(Some(&order_date), Some(&number))?;

    let updated = state
        .store
        .settle_credit(key)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", key)))?;

    tracing::info!(order = %key, "Credit settled");
    Ok(Json(SettleCreditResponse {
        message: "Order credit status updated to 0".to_string(),
        updated_attributes: UpdatedAttributes {
            credit_status: updated.credit_status.as_flag(),
        },
    }))
}
