use axum::{
    routing::{get, post, put},
    Router,
};
use crate::handlers::{affiliate, dashboard, message, order, product, transaction, withdrawal};
use crate::middleware::auth::require_reseller;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::reseller_dashboard))
        .route("/products", get(product::available_products))
        .route("/orders", get(order::list_own_orders).post(order::place_order))
        .route("/orders/{id}", get(order::get_own_order))
        .route("/orders/{id}/payment", post(order::submit_payment))
        .route(
            "/withdrawals",
            get(withdrawal::list_own_withdrawals).post(withdrawal::request_withdrawal),
        )
        .route("/transactions", get(transaction::list_transactions))
        .route("/affiliate", get(affiliate::affiliate_summary))
        .route(
            "/messages",
            get(message::list_own_messages).post(message::send_message_to_admin),
        )
        .route("/messages/read", put(message::mark_own_messages_read))
        .route_layer(axum::middleware::from_fn(require_reseller))
}
