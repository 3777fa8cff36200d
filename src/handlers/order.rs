use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::dtos::order::{
    AdminOrder, PlaceOrderRequest, ResellerOrder, SubmitPaymentRequest, UpdateOrderStatusRequest,
};
use crate::error::AppError;
use crate::ledger::{self, NewOrder};
use crate::middleware::auth::AuthContext;
use crate::models::order::OrderStatus;
use crate::notify::Room;
use crate::state::AppState;

// POST /api/reseller/orders
pub async fn place_order(
    State(AppState { db_pool, events }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if payload.customer_name.trim().is_empty()
        || payload.customer_phone.trim().is_empty()
        || payload.customer_address.trim().is_empty()
    {
        return Err(AppError::validation("Customer details are required"));
    }

    let mut tx = db_pool.begin().await?;
    let order_id = ledger::place_order(
        &mut tx,
        auth.user_id,
        &NewOrder {
            product_id: payload.product_id,
            reseller_price: payload.reseller_price,
            customer_name: payload.customer_name.trim(),
            customer_phone: payload.customer_phone.trim(),
            customer_address: payload.customer_address.trim(),
            payment_method: &payload.payment_method,
            location: &payload.location,
        },
    )
    .await?;
    tx.commit().await?;

    events.emit(Room::Admin, "update_orders");

    Ok((StatusCode::CREATED, Json(json!({ "id": order_id }))))
}

// GET /api/reseller/orders
pub async fn list_own_orders(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ResellerOrder>>, AppError> {
    let orders = sqlx::query_as::<_, ResellerOrder>(
        "SELECT o.*, p.name AS product_name \
         FROM orders o \
         JOIN products p ON o.product_id = p.id \
         WHERE o.reseller_id = ? \
         ORDER BY o.id DESC",
    )
    .bind(auth.user_id)
    .fetch_all(&db_pool)
    .await?;
    Ok(Json(orders))
}

// GET /api/reseller/orders/:id
pub async fn get_own_order(
    State(AppState { db_pool, .. }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<ResellerOrder>, AppError> {
    let order = sqlx::query_as::<_, ResellerOrder>(
        "SELECT o.*, p.name AS product_name \
         FROM orders o \
         JOIN products p ON o.product_id = p.id \
         WHERE o.id = ? AND o.reseller_id = ?",
    )
    .bind(id)
    .bind(auth.user_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Order not found"))?;
    Ok(Json(order))
}

// POST /api/reseller/orders/:id/payment
pub async fn submit_payment(
    State(AppState { db_pool, events }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<SubmitPaymentRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if payload.method.trim().is_empty()
        || payload.phone.trim().is_empty()
        || payload.trx_id.trim().is_empty()
        || payload.payer_name.trim().is_empty()
    {
        return Err(AppError::validation("All payment fields are required"));
    }

    let result = sqlx::query(
        "UPDATE orders SET payment_provider = ?, payment_phone = ?, transaction_id = ?, payer_name = ? \
         WHERE id = ? AND reseller_id = ?",
    )
    .bind(payload.method.trim())
    .bind(payload.phone.trim())
    .bind(payload.trx_id.trim())
    .bind(payload.payer_name.trim())
    .bind(id)
    .bind(auth.user_id)
    .execute(&db_pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Order not found"));
    }

    events.emit(Room::Admin, "update_orders");

    Ok(Json(json!({ "success": true })))
}

// GET /api/admin/orders
pub async fn list_all_orders(
    State(AppState { db_pool, .. }): State<AppState>,
) -> Result<Json<Vec<AdminOrder>>, AppError> {
    let orders = sqlx::query_as::<_, AdminOrder>(
        "SELECT o.*, p.name AS product_name, r.name AS reseller_name \
         FROM orders o \
         JOIN products p ON o.product_id = p.id \
         JOIN resellers r ON o.reseller_id = r.id \
         ORDER BY o.id DESC",
    )
    .fetch_all(&db_pool)
    .await?;
    Ok(Json(orders))
}

// PUT /api/admin/orders/:id/status
pub async fn update_order_status(
    State(AppState { db_pool, events }): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let status = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::validation("Invalid order status"))?;

    let mut tx = db_pool.begin().await?;
    let change = ledger::transition_order_status(&mut tx, id, status).await?;
    tx.commit().await?;

    events.emit(Room::Admin, "update_orders");
    events.emit(Room::Reseller(change.reseller_id), "update_orders");
    if change.balance_delta != 0.0 {
        events.emit(Room::Reseller(change.reseller_id), "update_balance");
    }

    Ok(Json(json!({ "success": true })))
}
