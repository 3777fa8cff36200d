use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// One row per reseller in the admin inbox.
#[derive(sqlx::FromRow, Serialize)]
pub struct Conversation {
    pub reseller_id: i64,
    pub reseller_name: String,
    pub last_message: Option<String>,
    pub last_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
}
