use axum::{response::{Response, IntoResponse}};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum_extra::extract::cookie::CookieJar;
use crate::auth::jwt::{verify_token, jwt_secret};
use serde::Serialize;

pub const SESSION_COOKIE: &str = "token";

#[derive(Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: String,
}

#[derive(Serialize)]
struct ErrorBody { error: String }

use axum::http::Request;

pub async fn require_admin(jar: CookieJar, req: Request<axum::body::Body>, next: Next) -> Response {
    require_role("admin", jar, req, next).await
}

pub async fn require_reseller(jar: CookieJar, req: Request<axum::body::Body>, next: Next) -> Response {
    require_role("reseller", jar, req, next).await
}

async fn require_role(
    role: &'static str,
    jar: CookieJar,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match jar.get(SESSION_COOKIE) {
        Some(c) => c.value().to_string(),
        None => return unauthorized("Unauthorized"),
    };

    let claims = match verify_token(&token, &jwt_secret()) {
        Ok(c) => c,
        Err(_) => return unauthorized("Invalid token"),
    };

    if claims.role != role {
        let body = axum::Json(ErrorBody { error: "Forbidden".to_string() });
        return (StatusCode::FORBIDDEN, body).into_response();
    }

    // Attach context
    req.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
        role: claims.role,
    });

    next.run(req).await
}

fn unauthorized(msg: &str) -> Response {
    let body = axum::Json(ErrorBody { error: msg.to_string() });
    (StatusCode::UNAUTHORIZED, body).into_response()
}
