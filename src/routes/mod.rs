pub mod auth;
pub mod admin;
pub mod reseller;

use axum::{routing::get, Router};
use crate::handlers::events;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::routes())
        .nest("/api/admin", admin::routes())
        .nest("/api/reseller", reseller::routes())
        .route("/api/events", get(events::events_ws))
}
