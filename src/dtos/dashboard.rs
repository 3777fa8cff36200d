use serde::Serialize;

#[derive(Serialize)]
pub struct AdminDashboard {
    pub total_sales: f64,
    pub total_profit: f64,
    pub total_resellers: i64,
    pub pending_withdrawals: i64,
}

#[derive(Serialize)]
pub struct ResellerDashboard {
    pub total_sales: f64,
    pub total_profit: f64,
    pub balance: f64,
}
