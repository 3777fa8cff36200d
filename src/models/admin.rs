#[derive(Debug, sqlx::FromRow)]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}
