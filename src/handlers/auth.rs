use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde_json::json;

use crate::auth::jwt::{jwt_secret, sign_token, verify_token};
use crate::dtos::auth::{AuthResponse, AuthUser, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::ledger::{self, NewReseller};
use crate::middleware::auth::SESSION_COOKIE;
use crate::models::admin::Admin;
use crate::models::reseller::Reseller;
use crate::state::AppState;

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

pub async fn login(
    State(AppState { db_pool, .. }): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let (user, password_hash) = match payload.role.as_str() {
        "admin" => {
            let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = ?")
                .bind(&payload.email)
                .fetch_optional(&db_pool)
                .await?
                .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;
            (
                AuthUser {
                    id: admin.id,
                    name: admin.name,
                    email: admin.email,
                    role: "admin".to_string(),
                    balance: None,
                },
                admin.password,
            )
        }
        "reseller" => {
            let reseller = sqlx::query_as::<_, Reseller>("SELECT * FROM resellers WHERE email = ?")
                .bind(&payload.email)
                .fetch_optional(&db_pool)
                .await?
                .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;
            (
                AuthUser {
                    id: reseller.id,
                    name: reseller.name,
                    email: reseller.email,
                    role: "reseller".to_string(),
                    balance: Some(reseller.balance),
                },
                reseller.password,
            )
        }
        _ => return Err(AppError::validation("Invalid role")),
    };

    let ok = verify(&payload.password, &password_hash)
        .map_err(|e| AppError::internal(format!("Password verify error: {e}")))?;
    if !ok {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let token = sign_token(user.id, &user.role, &jwt_secret())?;

    Ok((jar.add(session_cookie(token)), Json(AuthResponse { user })))
}

pub async fn register(
    State(AppState { db_pool, .. }): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Name required"));
    }
    if payload.email.trim().is_empty() {
        return Err(AppError::validation("Email required"));
    }
    if payload.password.len() < 6 {
        return Err(AppError::validation("Password too short"));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Hash error: {e}")))?;

    let mut tx = db_pool.begin().await?;
    let new_id = ledger::register_reseller(
        &mut tx,
        &NewReseller {
            name: payload.name.trim(),
            email: payload.email.trim(),
            password_hash: &password_hash,
            referral_code: payload.referral_code.as_deref(),
        },
    )
    .await?;
    tx.commit().await?;

    let token = sign_token(new_id, "reseller", &jwt_secret())?;

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token)),
        Json(AuthResponse {
            user: AuthUser {
                id: new_id,
                name: payload.name.trim().to_string(),
                email: payload.email.trim().to_string(),
                role: "reseller".to_string(),
                balance: Some(0.0),
            },
        }),
    ))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (jar, Json(json!({ "success": true })))
}

pub async fn me(
    State(AppState { db_pool, .. }): State<AppState>,
    jar: CookieJar,
) -> Result<Json<AuthResponse>, AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;
    let claims = verify_token(&token, &jwt_secret())?;

    let user = match claims.role.as_str() {
        "admin" => {
            let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
                .bind(claims.sub)
                .fetch_optional(&db_pool)
                .await?
                .ok_or_else(|| AppError::unauthorized("User not found"))?;
            AuthUser {
                id: admin.id,
                name: admin.name,
                email: admin.email,
                role: "admin".to_string(),
                balance: None,
            }
        }
        _ => {
            let reseller = sqlx::query_as::<_, Reseller>("SELECT * FROM resellers WHERE id = ?")
                .bind(claims.sub)
                .fetch_optional(&db_pool)
                .await?
                .ok_or_else(|| AppError::unauthorized("User not found"))?;
            AuthUser {
                id: reseller.id,
                name: reseller.name,
                email: reseller.email,
                role: "reseller".to_string(),
                balance: Some(reseller.balance),
            }
        }
    };

    Ok(Json(AuthResponse { user }))
}
