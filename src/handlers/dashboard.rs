use axum::{extract::Extension, extract::State, Json};

use crate::dtos::dashboard::{AdminDashboard, ResellerDashboard};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

// GET /api/admin/dashboard
pub async fn admin_dashboard(
    State(AppState { db_pool, .. }): State<AppState>,
) -> Result<Json<AdminDashboard>, AppError> {
    let total_sales: Option<f64> =
        sqlx::query_scalar("SELECT SUM(admin_price) FROM orders WHERE status = 'Delivered'")
            .fetch_one(&db_pool)
            .await?;
    let total_profit: Option<f64> =
        sqlx::query_scalar("SELECT SUM(profit) FROM orders WHERE status = 'Delivered'")
            .fetch_one(&db_pool)
            .await?;
    let total_resellers: i64 = sqlx::query_scalar("SELECT count(*) FROM resellers")
        .fetch_one(&db_pool)
        .await?;
    let pending_withdrawals: i64 =
        sqlx::query_scalar("SELECT count(*) FROM withdrawals WHERE status = 'Pending'")
            .fetch_one(&db_pool)
            .await?;

    Ok(Json(AdminDashboard {
        total_sales: total_sales.unwrap_or(0.0),
        total_profit: total_profit.unwrap_or(0.0),
        total_resellers,
        pending_withdrawals,
    }))
}

// GET /api/reseller/dashboard
pub async fn reseller_dashboard(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ResellerDashboard>, AppError> {
    let total_sales: Option<f64> = sqlx::query_scalar(
        "SELECT SUM(reseller_price) FROM orders WHERE reseller_id = ? AND status = 'Delivered'",
    )
    .bind(auth.user_id)
    .fetch_one(&db_pool)
    .await?;
    let total_profit: Option<f64> = sqlx::query_scalar(
        "SELECT SUM(profit) FROM orders WHERE reseller_id = ? AND status = 'Delivered'",
    )
    .bind(auth.user_id)
    .fetch_one(&db_pool)
    .await?;
    let balance: f64 = sqlx::query_scalar("SELECT balance FROM resellers WHERE id = ?")
        .bind(auth.user_id)
        .fetch_one(&db_pool)
        .await?;

    Ok(Json(ResellerDashboard {
        total_sales: total_sales.unwrap_or(0.0),
        total_profit: total_profit.unwrap_or(0.0),
        balance,
    }))
}
