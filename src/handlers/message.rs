use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::dtos::message::{Conversation, SendMessageRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::message::Message;
use crate::notify::Room;
use crate::state::AppState;

// GET /api/reseller/messages
pub async fn list_own_messages(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages =
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE reseller_id = ? ORDER BY id")
            .bind(auth.user_id)
            .fetch_all(&db_pool)
            .await?;
    Ok(Json(messages))
}

// POST /api/reseller/messages
pub async fn send_message_to_admin(
    State(AppState { db_pool, events }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::validation("Message content required"));
    }

    let message = sqlx::query_as::<_, Message>(
        "INSERT INTO messages (reseller_id, sender, content) VALUES (?, 'reseller', ?) RETURNING *",
    )
    .bind(auth.user_id)
    .bind(content)
    .fetch_one(&db_pool)
    .await?;

    events.emit(Room::Admin, "update_messages");

    Ok((StatusCode::CREATED, Json(message)))
}

// PUT /api/reseller/messages/read - mark the admin's side of the thread read
pub async fn mark_own_messages_read(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    sqlx::query("UPDATE messages SET is_read = 1 WHERE reseller_id = ? AND sender = 'admin'")
        .bind(auth.user_id)
        .execute(&db_pool)
        .await?;
    Ok(Json(json!({ "success": true })))
}

// GET /api/admin/messages/conversations
pub async fn list_conversations(
    State(AppState { db_pool, .. }): State<AppState>,
) -> Result<Json<Vec<Conversation>>, AppError> {
    let conversations = sqlx::query_as::<_, Conversation>(
        "SELECT r.id AS reseller_id, r.name AS reseller_name, \
                (SELECT m.content FROM messages m WHERE m.reseller_id = r.id ORDER BY m.id DESC LIMIT 1) AS last_message, \
                (SELECT m.created_at FROM messages m WHERE m.reseller_id = r.id ORDER BY m.id DESC LIMIT 1) AS last_at, \
                (SELECT count(*) FROM messages m WHERE m.reseller_id = r.id AND m.sender = 'reseller' AND m.is_read = 0) AS unread_count \
         FROM resellers r \
         WHERE EXISTS (SELECT 1 FROM messages m WHERE m.reseller_id = r.id) \
         ORDER BY last_at DESC",
    )
    .fetch_all(&db_pool)
    .await?;
    Ok(Json(conversations))
}

// GET /api/admin/messages/:reseller_id
pub async fn list_messages_with(
    State(AppState { db_pool, .. }): State<AppState>,
    Path(reseller_id): Path<i64>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages =
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE reseller_id = ? ORDER BY id")
            .bind(reseller_id)
            .fetch_all(&db_pool)
            .await?;
    Ok(Json(messages))
}

// POST /api/admin/messages/:reseller_id
pub async fn send_message_to_reseller(
    State(AppState { db_pool, events }): State<AppState>,
    Path(reseller_id): Path<i64>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::validation("Message content required"));
    }

    let exists: i64 = sqlx::query_scalar("SELECT count(*) FROM resellers WHERE id = ?")
        .bind(reseller_id)
        .fetch_one(&db_pool)
        .await?;
    if exists == 0 {
        return Err(AppError::not_found("Reseller not found"));
    }

    let message = sqlx::query_as::<_, Message>(
        "INSERT INTO messages (reseller_id, sender, content) VALUES (?, 'admin', ?) RETURNING *",
    )
    .bind(reseller_id)
    .bind(content)
    .fetch_one(&db_pool)
    .await?;

    events.emit(Room::Reseller(reseller_id), "update_messages");

    Ok((StatusCode::CREATED, Json(message)))
}

// PUT /api/admin/messages/:reseller_id/read
pub async fn mark_conversation_read(
    State(AppState { db_pool, .. }): State<AppState>,
    Path(reseller_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    sqlx::query("UPDATE messages SET is_read = 1 WHERE reseller_id = ? AND sender = 'reseller'")
        .bind(reseller_id)
        .execute(&db_pool)
        .await?;
    Ok(Json(json!({ "success": true })))
}
