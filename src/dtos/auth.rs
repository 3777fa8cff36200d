use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub referral_code: Option<String>,
}

#[derive(Serialize)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: AuthUser,
}
