use axum::{
    routing::{get, put},
    Router,
};
use crate::handlers::{dashboard, message, order, product, reseller, settings, withdrawal};
use crate::middleware::auth::require_admin;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::admin_dashboard))
        .route("/products", get(product::list_products).post(product::create_product))
        .route("/products/{id}", put(product::update_product).delete(product::delete_product))
        .route("/resellers", get(reseller::list_resellers))
        .route("/orders", get(order::list_all_orders))
        .route("/orders/{id}/status", put(order::update_order_status))
        .route("/withdrawals", get(withdrawal::list_all_withdrawals))
        .route("/withdrawals/{id}/status", put(withdrawal::update_withdrawal_status))
        .route("/settings", get(settings::get_settings).put(settings::update_settings))
        .route("/messages/conversations", get(message::list_conversations))
        .route(
            "/messages/{reseller_id}",
            get(message::list_messages_with).post(message::send_message_to_reseller),
        )
        .route("/messages/{reseller_id}/read", put(message::mark_conversation_read))
        .route_layer(axum::middleware::from_fn(require_admin))
}
