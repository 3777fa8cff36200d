use chrono::{DateTime, Utc};
use serde::Serialize;

/// Money-movement history entry, derived from approved withdrawals and
/// submitted advance payments.
#[derive(sqlx::FromRow, Serialize)]
pub struct TransactionEntry {
    pub id: i64,
    pub transaction_id: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
