use axum::{extract::State, Json};

use crate::dtos::reseller::ResellerSummary;
use crate::error::AppError;
use crate::state::AppState;

// GET /api/admin/resellers
pub async fn list_resellers(
    State(AppState { db_pool, .. }): State<AppState>,
) -> Result<Json<Vec<ResellerSummary>>, AppError> {
    let resellers = sqlx::query_as::<_, ResellerSummary>(
        "SELECT id, name, email, balance FROM resellers ORDER BY id DESC",
    )
    .fetch_all(&db_pool)
    .await?;
    Ok(Json(resellers))
}
