use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "Pending",
            WithdrawalStatus::Approved => "Approved",
            WithdrawalStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(WithdrawalStatus::Pending),
            "Approved" => Some(WithdrawalStatus::Approved),
            "Rejected" => Some(WithdrawalStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct Withdrawal {
    pub id: i64,
    pub reseller_id: i64,
    pub amount: f64,
    pub method: String,
    pub account_number: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
