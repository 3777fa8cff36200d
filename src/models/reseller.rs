#[derive(Debug, sqlx::FromRow)]
pub struct Reseller {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub balance: f64,
    pub referral_code: Option<String>,
    pub referred_by: Option<i64>,
}
