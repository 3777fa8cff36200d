use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an order. Only the Delivered transitions move money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(OrderStatus::Pending),
            "Shipped" => Some(OrderStatus::Shipped),
            "Delivered" => Some(OrderStatus::Delivered),
            "Cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub reseller_id: i64,
    pub product_id: i64,
    pub admin_price: f64,
    pub reseller_price: f64,
    pub profit: f64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub status: String,
    pub payment_method: String,
    pub location: String,
    pub delivery_charge: f64,
    pub payment_provider: Option<String>,
    pub payment_phone: Option<String>,
    pub payer_name: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
