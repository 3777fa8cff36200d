use serde::Serialize;

#[derive(sqlx::FromRow, Serialize)]
pub struct ReferredUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct AffiliateSummary {
    pub referral_code: String,
    pub total_earnings: f64,
    pub referred_users: Vec<ReferredUser>,
}
