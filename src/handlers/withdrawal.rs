use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::dtos::withdrawal::{
    AdminWithdrawal, CreateWithdrawalRequest, UpdateWithdrawalStatusRequest,
};
use crate::error::AppError;
use crate::ledger;
use crate::middleware::auth::AuthContext;
use crate::models::withdrawal::{Withdrawal, WithdrawalStatus};
use crate::notify::Room;
use crate::state::AppState;

// POST /api/reseller/withdrawals
pub async fn request_withdrawal(
    State(AppState { db_pool, events }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateWithdrawalRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if payload.method.trim().is_empty() || payload.account_number.trim().is_empty() {
        return Err(AppError::validation("Method and account number are required"));
    }

    let mut tx = db_pool.begin().await?;
    let id = ledger::request_withdrawal(
        &mut tx,
        auth.user_id,
        payload.amount,
        payload.method.trim(),
        payload.account_number.trim(),
    )
    .await?;
    tx.commit().await?;

    events.emit(Room::Admin, "update_withdrawals");

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// GET /api/reseller/withdrawals
pub async fn list_own_withdrawals(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<Withdrawal>>, AppError> {
    let withdrawals = sqlx::query_as::<_, Withdrawal>(
        "SELECT * FROM withdrawals WHERE reseller_id = ? ORDER BY id DESC",
    )
    .bind(auth.user_id)
    .fetch_all(&db_pool)
    .await?;
    Ok(Json(withdrawals))
}

// GET /api/admin/withdrawals
pub async fn list_all_withdrawals(
    State(AppState { db_pool, .. }): State<AppState>,
) -> Result<Json<Vec<AdminWithdrawal>>, AppError> {
    let withdrawals = sqlx::query_as::<_, AdminWithdrawal>(
        "SELECT w.*, r.name AS reseller_name \
         FROM withdrawals w \
         JOIN resellers r ON w.reseller_id = r.id \
         ORDER BY w.id DESC",
    )
    .fetch_all(&db_pool)
    .await?;
    Ok(Json(withdrawals))
}

// PUT /api/admin/withdrawals/:id/status
pub async fn update_withdrawal_status(
    State(AppState { db_pool, events }): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateWithdrawalStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let decision = WithdrawalStatus::parse(&payload.status)
        .ok_or_else(|| AppError::validation("Invalid withdrawal status"))?;

    let mut tx = db_pool.begin().await?;
    let resolution =
        ledger::resolve_withdrawal(&mut tx, id, decision, payload.transaction_id.as_deref())
            .await?;
    tx.commit().await?;

    events.emit(Room::Admin, "update_withdrawals");
    events.emit(Room::Reseller(resolution.reseller_id), "update_withdrawals");
    if resolution.approved {
        events.emit(Room::Reseller(resolution.reseller_id), "update_balance");
    }

    Ok(Json(json!({ "success": true })))
}
