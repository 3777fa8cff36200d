use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct Message {
    pub id: i64,
    pub reseller_id: i64,
    pub sender: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
