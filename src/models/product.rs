use serde::Serialize;

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub admin_price: f64,
    pub stock: i64,
    pub image: Option<String>,
}
