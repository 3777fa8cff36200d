use serde::{Deserialize, Serialize};

use crate::models::withdrawal::Withdrawal;

#[derive(Deserialize)]
pub struct CreateWithdrawalRequest {
    pub amount: f64,
    pub method: String,
    pub account_number: String,
}

#[derive(Deserialize)]
pub struct UpdateWithdrawalStatusRequest {
    pub status: String,
    pub transaction_id: Option<String>,
}

#[derive(sqlx::FromRow, Serialize)]
pub struct AdminWithdrawal {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub withdrawal: Withdrawal,
    pub reseller_name: String,
}
