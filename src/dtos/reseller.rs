use serde::Serialize;

/// Reseller as listed for the admin; never exposes the password hash.
#[derive(sqlx::FromRow, Serialize)]
pub struct ResellerSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub balance: f64,
}
