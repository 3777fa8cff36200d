use serde::{Deserialize, Serialize};

use crate::models::order::Order;

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub product_id: i64,
    pub reseller_price: f64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub payment_method: String,
    pub location: String,
}

#[derive(Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

/// Advance payment details submitted by the reseller after placing an
/// advance order.
#[derive(Deserialize)]
pub struct SubmitPaymentRequest {
    pub method: String,
    pub phone: String,
    pub trx_id: String,
    pub payer_name: String,
}

#[derive(sqlx::FromRow, Serialize)]
pub struct ResellerOrder {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub product_name: String,
}

#[derive(sqlx::FromRow, Serialize)]
pub struct AdminOrder {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub product_name: String,
    pub reseller_name: String,
}
