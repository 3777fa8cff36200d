use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

// GET /api/admin/settings - flat key/value map
pub async fn get_settings(
    State(AppState { db_pool, .. }): State<AppState>,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    let rows = sqlx::query_as::<_, (String, String)>("SELECT key, value FROM settings")
        .fetch_all(&db_pool)
        .await?;
    Ok(Json(rows.into_iter().collect()))
}

// PUT /api/admin/settings - upsert every submitted pair
pub async fn update_settings(
    State(AppState { db_pool, .. }): State<AppState>,
    Json(payload): Json<BTreeMap<String, String>>,
) -> Result<Json<serde_json::Value>, AppError> {
    if payload.is_empty() {
        return Err(AppError::validation("No settings provided"));
    }

    let mut tx = db_pool.begin().await?;
    for (key, value) in &payload {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(Json(json!({ "success": true })))
}
