// src/ledger.rs
//
// The money-moving operations. Every function here runs against a
// `&mut SqliteConnection` so the calling handler owns the transaction
// boundary: begin, run one operation, commit. A business-rule error
// aborts the whole transaction and no partial mutation survives.

use rand::Rng;
use sqlx::SqliteConnection;

use crate::error::AppError;
use crate::models::order::OrderStatus;
use crate::models::withdrawal::WithdrawalStatus;

pub const MIN_WITHDRAWAL: f64 = 500.0;

const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 8;
const CODE_MAX_ATTEMPTS: usize = 16;

#[derive(Debug)]
pub struct NewOrder<'a> {
    pub product_id: i64,
    pub reseller_price: f64,
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub customer_address: &'a str,
    pub payment_method: &'a str,
    pub location: &'a str,
}

#[derive(Debug)]
pub struct NewReseller<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub referral_code: Option<&'a str>,
}

/// Outcome of an order status transition, for post-commit notification.
#[derive(Debug)]
pub struct StatusChange {
    pub reseller_id: i64,
    pub balance_delta: f64,
}

/// Outcome of a withdrawal resolution, for post-commit notification.
#[derive(Debug)]
pub struct Resolution {
    pub reseller_id: i64,
    pub approved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BonusKind {
    Fixed,
    Percentage,
}

#[derive(sqlx::FromRow)]
struct OrderHead {
    reseller_id: i64,
    profit: f64,
    status: String,
}

#[derive(sqlx::FromRow)]
struct WithdrawalHead {
    reseller_id: i64,
    amount: f64,
    status: String,
}

/// Place an order for one unit: validate the price floor and stock,
/// price the delivery tier, insert the Pending row and decrement stock.
pub async fn place_order(
    conn: &mut SqliteConnection,
    reseller_id: i64,
    order: &NewOrder<'_>,
) -> Result<i64, AppError> {
    if !matches!(order.payment_method, "advance" | "cod") {
        return Err(AppError::validation("Invalid payment method"));
    }
    if !matches!(order.location, "inside" | "outside") {
        return Err(AppError::validation("Invalid delivery location"));
    }

    let product: Option<(f64, i64)> =
        sqlx::query_as("SELECT admin_price, stock FROM products WHERE id = ?")
            .bind(order.product_id)
            .fetch_optional(&mut *conn)
            .await?;
    let (admin_price, stock) = product.ok_or_else(|| AppError::not_found("Product not found"))?;

    if stock <= 0 {
        return Err(AppError::validation("Out of stock"));
    }
    if order.reseller_price < admin_price {
        return Err(AppError::validation(
            "Reseller price cannot be less than admin price",
        ));
    }

    let profit = order.reseller_price - admin_price;
    let charge = delivery_charge(conn, order.payment_method, order.location).await?;

    let result = sqlx::query(
        "INSERT INTO orders (reseller_id, product_id, admin_price, reseller_price, profit, \
         customer_name, customer_phone, customer_address, status, payment_method, location, delivery_charge) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'Pending', ?, ?, ?)",
    )
    .bind(reseller_id)
    .bind(order.product_id)
    .bind(admin_price)
    .bind(order.reseller_price)
    .bind(profit)
    .bind(order.customer_name)
    .bind(order.customer_phone)
    .bind(order.customer_address)
    .bind(order.payment_method)
    .bind(order.location)
    .bind(charge)
    .execute(&mut *conn)
    .await?;

    sqlx::query("UPDATE products SET stock = stock - 1 WHERE id = ?")
        .bind(order.product_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Move an order to a new status, crediting the reseller's profit when it
/// enters Delivered and debiting it when it leaves. A configured
/// percentage referral bonus moves with it, posted as a signed
/// referral_earnings row (a reversal posts a negative row, the original
/// entry is never deleted).
pub async fn transition_order_status(
    conn: &mut SqliteConnection,
    order_id: i64,
    new_status: OrderStatus,
) -> Result<StatusChange, AppError> {
    let order: Option<OrderHead> =
        sqlx::query_as("SELECT reseller_id, profit, status FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&mut *conn)
            .await?;
    let order = order.ok_or_else(|| AppError::not_found("Order not found"))?;

    let old_status = OrderStatus::parse(&order.status)
        .ok_or_else(|| AppError::internal(format!("Order {order_id} has status {}", order.status)))?;

    let delta = match (old_status == OrderStatus::Delivered, new_status == OrderStatus::Delivered) {
        (false, true) => order.profit,
        (true, false) => -order.profit,
        _ => 0.0,
    };

    if delta != 0.0 {
        sqlx::query("UPDATE resellers SET balance = balance + ? WHERE id = ?")
            .bind(delta)
            .bind(order.reseller_id)
            .execute(&mut *conn)
            .await?;

        let referred_by: Option<i64> =
            sqlx::query_scalar("SELECT referred_by FROM resellers WHERE id = ?")
                .bind(order.reseller_id)
                .fetch_one(&mut *conn)
                .await?;

        if let Some(referrer_id) = referred_by {
            if let Some((BonusKind::Percentage, percent)) = referral_bonus(conn).await? {
                let bonus = delta * percent / 100.0;
                sqlx::query("UPDATE resellers SET balance = balance + ? WHERE id = ?")
                    .bind(bonus)
                    .bind(referrer_id)
                    .execute(&mut *conn)
                    .await?;
                sqlx::query(
                    "INSERT INTO referral_earnings (referrer_id, referred_id, amount, type) \
                     VALUES (?, ?, ?, 'order')",
                )
                .bind(referrer_id)
                .bind(order.reseller_id)
                .bind(bonus)
                .execute(&mut *conn)
                .await?;
            }
        }
    }

    sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(new_status.as_str())
        .bind(order_id)
        .execute(&mut *conn)
        .await?;

    Ok(StatusChange {
        reseller_id: order.reseller_id,
        balance_delta: delta,
    })
}

/// Approve or reject a Pending withdrawal. Approval requires a transaction
/// reference and enough balance to cover the amount; rejection touches no
/// money. A resolved withdrawal cannot be processed again.
pub async fn resolve_withdrawal(
    conn: &mut SqliteConnection,
    withdrawal_id: i64,
    decision: WithdrawalStatus,
    transaction_id: Option<&str>,
) -> Result<Resolution, AppError> {
    let withdrawal: Option<WithdrawalHead> =
        sqlx::query_as("SELECT reseller_id, amount, status FROM withdrawals WHERE id = ?")
            .bind(withdrawal_id)
            .fetch_optional(&mut *conn)
            .await?;
    let withdrawal = withdrawal.ok_or_else(|| AppError::not_found("Withdrawal not found"))?;

    if withdrawal.status != WithdrawalStatus::Pending.as_str() {
        return Err(AppError::validation("Withdrawal already processed"));
    }

    match decision {
        WithdrawalStatus::Pending => {
            Err(AppError::validation("Status must be Approved or Rejected"))
        }
        WithdrawalStatus::Approved => {
            let reference = transaction_id
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| AppError::validation("Transaction reference is required"))?;

            let balance: f64 = sqlx::query_scalar("SELECT balance FROM resellers WHERE id = ?")
                .bind(withdrawal.reseller_id)
                .fetch_one(&mut *conn)
                .await?;
            if balance < withdrawal.amount {
                return Err(AppError::validation("Insufficient balance"));
            }

            sqlx::query("UPDATE resellers SET balance = balance - ? WHERE id = ?")
                .bind(withdrawal.amount)
                .bind(withdrawal.reseller_id)
                .execute(&mut *conn)
                .await?;
            sqlx::query("UPDATE withdrawals SET status = 'Approved', transaction_id = ? WHERE id = ?")
                .bind(reference)
                .bind(withdrawal_id)
                .execute(&mut *conn)
                .await?;

            Ok(Resolution {
                reseller_id: withdrawal.reseller_id,
                approved: true,
            })
        }
        WithdrawalStatus::Rejected => {
            sqlx::query("UPDATE withdrawals SET status = 'Rejected' WHERE id = ?")
                .bind(withdrawal_id)
                .execute(&mut *conn)
                .await?;

            Ok(Resolution {
                reseller_id: withdrawal.reseller_id,
                approved: false,
            })
        }
    }
}

/// Create a Pending withdrawal request. The available balance excludes
/// holds from the reseller's other Pending requests, so stacked requests
/// cannot overdraw once they are all approved.
pub async fn request_withdrawal(
    conn: &mut SqliteConnection,
    reseller_id: i64,
    amount: f64,
    method: &str,
    account_number: &str,
) -> Result<i64, AppError> {
    if amount < MIN_WITHDRAWAL {
        return Err(AppError::validation(format!(
            "Minimum withdrawal amount is {MIN_WITHDRAWAL}"
        )));
    }

    let balance: f64 = sqlx::query_scalar("SELECT balance FROM resellers WHERE id = ?")
        .bind(reseller_id)
        .fetch_one(&mut *conn)
        .await?;
    let pending: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0.0) FROM withdrawals WHERE reseller_id = ? AND status = 'Pending'",
    )
    .bind(reseller_id)
    .fetch_one(&mut *conn)
    .await?;

    if balance - pending < amount {
        return Err(AppError::validation("Insufficient balance"));
    }

    let result = sqlx::query(
        "INSERT INTO withdrawals (reseller_id, amount, method, account_number) VALUES (?, ?, ?, ?)",
    )
    .bind(reseller_id)
    .bind(amount)
    .bind(method)
    .bind(account_number)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Create a reseller account, linking a referrer when a known referral
/// code is supplied. A configured fixed bonus is credited to the referrer
/// immediately, atomically with the account row.
pub async fn register_reseller(
    conn: &mut SqliteConnection,
    reseller: &NewReseller<'_>,
) -> Result<i64, AppError> {
    // An absent or unknown code leaves the account unlinked; it never
    // fails the registration.
    let referrer_id: Option<i64> = match reseller.referral_code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => {
            sqlx::query_scalar("SELECT id FROM resellers WHERE referral_code = ?")
                .bind(code)
                .fetch_optional(&mut *conn)
                .await?
        }
        None => None,
    };

    let own_code = generate_referral_code(conn).await?;

    let result = sqlx::query(
        "INSERT INTO resellers (name, email, password, referral_code, referred_by) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(reseller.name)
    .bind(reseller.email)
    .bind(reseller.password_hash)
    .bind(&own_code)
    .bind(referrer_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::conflict("Email already registered")
        }
        _ => AppError::from(e),
    })?;
    let new_id = result.last_insert_rowid();

    if let Some(referrer_id) = referrer_id {
        if let Some((BonusKind::Fixed, bonus)) = referral_bonus(conn).await? {
            sqlx::query("UPDATE resellers SET balance = balance + ? WHERE id = ?")
                .bind(bonus)
                .bind(referrer_id)
                .execute(&mut *conn)
                .await?;
            sqlx::query(
                "INSERT INTO referral_earnings (referrer_id, referred_id, amount, type) \
                 VALUES (?, ?, ?, 'registration')",
            )
            .bind(referrer_id)
            .bind(new_id)
            .bind(bonus)
            .execute(&mut *conn)
            .await?;
        }
    }

    Ok(new_id)
}

/// Generate a referral code no existing reseller holds.
pub async fn generate_referral_code(conn: &mut SqliteConnection) -> Result<String, AppError> {
    for _ in 0..CODE_MAX_ATTEMPTS {
        // ThreadRng is not Send; keep it out of scope across the await.
        let code: String = {
            let mut rng = rand::thread_rng();
            (0..CODE_LEN)
                .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
                .collect()
        };

        let taken: i64 =
            sqlx::query_scalar("SELECT count(*) FROM resellers WHERE referral_code = ?")
                .bind(&code)
                .fetch_one(&mut *conn)
                .await?;
        if taken == 0 {
            return Ok(code);
        }
    }
    Err(AppError::internal("Could not allocate a referral code"))
}

/// Delivery fee for a (payment method, location) pair, priced from the
/// settings table. Missing or malformed tiers price as 0.
pub async fn delivery_charge(
    conn: &mut SqliteConnection,
    payment_method: &str,
    location: &str,
) -> Result<f64, AppError> {
    let key = format!("delivery_charge_{payment_method}_{location}");
    let value = get_setting(conn, &key).await?;
    Ok(value.and_then(|v| v.parse::<f64>().ok()).unwrap_or(0.0))
}

pub async fn get_setting(
    conn: &mut SqliteConnection,
    key: &str,
) -> Result<Option<String>, AppError> {
    let value = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(value)
}

async fn referral_bonus(conn: &mut SqliteConnection) -> Result<Option<(BonusKind, f64)>, AppError> {
    let kind = get_setting(conn, "referral_bonus_type").await?;
    let amount = get_setting(conn, "referral_bonus_amount")
        .await?
        .and_then(|v| v.parse::<f64>().ok());

    Ok(match (kind.as_deref(), amount) {
        (Some("fixed"), Some(amount)) => Some((BonusKind::Fixed, amount)),
        (Some("percentage"), Some(amount)) => Some((BonusKind::Percentage, amount)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
    use std::time::Duration;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::database::init_schema(&pool).await.unwrap();
        pool
    }

    async fn add_reseller(pool: &SqlitePool, name: &str, balance: f64) -> i64 {
        sqlx::query("INSERT INTO resellers (name, email, password, balance) VALUES (?, ?, 'x', ?)")
            .bind(name)
            .bind(format!("{name}@test.local"))
            .bind(balance)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    async fn add_product(pool: &SqlitePool, admin_price: f64, stock: i64) -> i64 {
        sqlx::query("INSERT INTO products (name, admin_price, stock) VALUES ('Widget', ?, ?)")
            .bind(admin_price)
            .bind(stock)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    async fn set_setting(pool: &SqlitePool, key: &str, value: &str) {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn balance_of(pool: &SqlitePool, id: i64) -> f64 {
        sqlx::query_scalar("SELECT balance FROM resellers WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn stock_of(pool: &SqlitePool, id: i64) -> i64 {
        sqlx::query_scalar("SELECT stock FROM products WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn order_for(product_id: i64, reseller_price: f64) -> NewOrder<'static> {
        NewOrder {
            product_id,
            reseller_price,
            customer_name: "Customer",
            customer_phone: "017000000",
            customer_address: "Dhaka",
            payment_method: "cod",
            location: "inside",
        }
    }

    async fn place(pool: &SqlitePool, reseller_id: i64, order: &NewOrder<'_>) -> Result<i64, AppError> {
        let mut tx = pool.begin().await.unwrap();
        let result = place_order(&mut tx, reseller_id, order).await;
        if result.is_ok() {
            tx.commit().await.unwrap();
        }
        result
    }

    async fn transition(
        pool: &SqlitePool,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<StatusChange, AppError> {
        let mut tx = pool.begin().await.unwrap();
        let result = transition_order_status(&mut tx, order_id, status).await;
        if result.is_ok() {
            tx.commit().await.unwrap();
        }
        result
    }

    #[tokio::test]
    async fn order_profit_is_margin_and_stock_drops() {
        let pool = test_pool().await;
        let reseller = add_reseller(&pool, "rita", 0.0).await;
        let product = add_product(&pool, 1000.0, 5).await;

        let order_id = place(&pool, reseller, &order_for(product, 1200.0)).await.unwrap();

        let (profit, status): (f64, String) =
            sqlx::query_as("SELECT profit, status FROM orders WHERE id = ?")
                .bind(order_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(profit, 200.0);
        assert_eq!(status, "Pending");
        assert_eq!(stock_of(&pool, product).await, 4);
    }

    #[tokio::test]
    async fn order_below_floor_fails_and_keeps_stock() {
        let pool = test_pool().await;
        let reseller = add_reseller(&pool, "rita", 0.0).await;
        let product = add_product(&pool, 1000.0, 5).await;

        let err = place(&pool, reseller, &order_for(product, 900.0)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(stock_of(&pool, product).await, 5);

        let orders: i64 = sqlx::query_scalar("SELECT count(*) FROM orders")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orders, 0);
    }

    #[tokio::test]
    async fn order_out_of_stock_fails() {
        let pool = test_pool().await;
        let reseller = add_reseller(&pool, "rita", 0.0).await;
        let product = add_product(&pool, 1000.0, 0).await;

        let err = place(&pool, reseller, &order_for(product, 1200.0)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn delivery_tiers_are_priced_from_settings() {
        let pool = test_pool().await;
        set_setting(&pool, "delivery_charge_cod_inside", "100").await;
        set_setting(&pool, "delivery_charge_advance_outside", "120").await;

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(delivery_charge(&mut conn, "cod", "inside").await.unwrap(), 100.0);
        assert_eq!(delivery_charge(&mut conn, "advance", "outside").await.unwrap(), 120.0);
        // Unconfigured tier prices as zero.
        assert_eq!(delivery_charge(&mut conn, "cod", "outside").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn delivered_then_cancelled_is_balance_neutral() {
        let pool = test_pool().await;
        let reseller = add_reseller(&pool, "rita", 0.0).await;
        let product = add_product(&pool, 1000.0, 5).await;
        let order_id = place(&pool, reseller, &order_for(product, 1200.0)).await.unwrap();

        let change = transition(&pool, order_id, OrderStatus::Delivered).await.unwrap();
        assert_eq!(change.balance_delta, 200.0);
        assert_eq!(balance_of(&pool, reseller).await, 200.0);

        let change = transition(&pool, order_id, OrderStatus::Cancelled).await.unwrap();
        assert_eq!(change.balance_delta, -200.0);
        assert_eq!(balance_of(&pool, reseller).await, 0.0);
    }

    #[tokio::test]
    async fn repeating_a_status_moves_no_money() {
        let pool = test_pool().await;
        let reseller = add_reseller(&pool, "rita", 0.0).await;
        let product = add_product(&pool, 1000.0, 5).await;
        let order_id = place(&pool, reseller, &order_for(product, 1200.0)).await.unwrap();

        transition(&pool, order_id, OrderStatus::Delivered).await.unwrap();
        let change = transition(&pool, order_id, OrderStatus::Delivered).await.unwrap();
        assert_eq!(change.balance_delta, 0.0);
        assert_eq!(balance_of(&pool, reseller).await, 200.0);

        // Leaving Delivered debits; moving between non-Delivered states does not.
        let change = transition(&pool, order_id, OrderStatus::Shipped).await.unwrap();
        assert_eq!(change.balance_delta, -200.0);
        let change = transition(&pool, order_id, OrderStatus::Pending).await.unwrap();
        assert_eq!(change.balance_delta, 0.0);
        assert_eq!(balance_of(&pool, reseller).await, 0.0);
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let pool = test_pool().await;
        let err = transition(&pool, 999, OrderStatus::Shipped).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn percentage_bonus_follows_delivery_and_reversal() {
        let pool = test_pool().await;
        set_setting(&pool, "referral_bonus_type", "percentage").await;
        set_setting(&pool, "referral_bonus_amount", "10").await;

        let referrer = add_reseller(&pool, "ref", 0.0).await;
        let reseller = add_reseller(&pool, "rita", 0.0).await;
        sqlx::query("UPDATE resellers SET referred_by = ? WHERE id = ?")
            .bind(referrer)
            .bind(reseller)
            .execute(&pool)
            .await
            .unwrap();

        let product = add_product(&pool, 1000.0, 5).await;
        let order_id = place(&pool, reseller, &order_for(product, 1200.0)).await.unwrap();

        transition(&pool, order_id, OrderStatus::Delivered).await.unwrap();
        assert_eq!(balance_of(&pool, referrer).await, 20.0);

        transition(&pool, order_id, OrderStatus::Cancelled).await.unwrap();
        assert_eq!(balance_of(&pool, referrer).await, 0.0);

        // Reversal appends a compensating negative row, keeping both.
        let amounts: Vec<f64> = sqlx::query_scalar(
            "SELECT amount FROM referral_earnings WHERE referrer_id = ? AND type = 'order' ORDER BY id",
        )
        .bind(referrer)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(amounts, vec![20.0, -20.0]);
    }

    #[tokio::test]
    async fn fixed_bonus_does_not_apply_to_orders() {
        let pool = test_pool().await;
        set_setting(&pool, "referral_bonus_type", "fixed").await;
        set_setting(&pool, "referral_bonus_amount", "50").await;

        let referrer = add_reseller(&pool, "ref", 0.0).await;
        let reseller = add_reseller(&pool, "rita", 0.0).await;
        sqlx::query("UPDATE resellers SET referred_by = ? WHERE id = ?")
            .bind(referrer)
            .bind(reseller)
            .execute(&pool)
            .await
            .unwrap();

        let product = add_product(&pool, 1000.0, 5).await;
        let order_id = place(&pool, reseller, &order_for(product, 1200.0)).await.unwrap();
        transition(&pool, order_id, OrderStatus::Delivered).await.unwrap();

        assert_eq!(balance_of(&pool, referrer).await, 0.0);
    }

    async fn resolve(
        pool: &SqlitePool,
        id: i64,
        decision: WithdrawalStatus,
        reference: Option<&str>,
    ) -> Result<Resolution, AppError> {
        let mut tx = pool.begin().await.unwrap();
        let result = resolve_withdrawal(&mut tx, id, decision, reference).await;
        if result.is_ok() {
            tx.commit().await.unwrap();
        }
        result
    }

    async fn request(pool: &SqlitePool, reseller_id: i64, amount: f64) -> Result<i64, AppError> {
        let mut tx = pool.begin().await.unwrap();
        let result = request_withdrawal(&mut tx, reseller_id, amount, "Bkash", "017").await;
        if result.is_ok() {
            tx.commit().await.unwrap();
        }
        result
    }

    #[tokio::test]
    async fn approval_debits_and_stores_reference() {
        let pool = test_pool().await;
        let reseller = add_reseller(&pool, "rita", 1000.0).await;
        let id = request(&pool, reseller, 600.0).await.unwrap();

        let resolution = resolve(&pool, id, WithdrawalStatus::Approved, Some("TRX123")).await.unwrap();
        assert!(resolution.approved);
        assert_eq!(balance_of(&pool, reseller).await, 400.0);

        let (status, reference): (String, Option<String>) =
            sqlx::query_as("SELECT status, transaction_id FROM withdrawals WHERE id = ?")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, "Approved");
        assert_eq!(reference.as_deref(), Some("TRX123"));
    }

    #[tokio::test]
    async fn approval_requires_a_reference() {
        let pool = test_pool().await;
        let reseller = add_reseller(&pool, "rita", 1000.0).await;
        let id = request(&pool, reseller, 600.0).await.unwrap();

        let err = resolve(&pool, id, WithdrawalStatus::Approved, None).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        let err = resolve(&pool, id, WithdrawalStatus::Approved, Some("  ")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(balance_of(&pool, reseller).await, 1000.0);
    }

    #[tokio::test]
    async fn approval_fails_on_insufficient_balance() {
        let pool = test_pool().await;
        let reseller = add_reseller(&pool, "rita", 1000.0).await;
        let id = request(&pool, reseller, 800.0).await.unwrap();

        // Balance dropped between request and approval.
        sqlx::query("UPDATE resellers SET balance = 500 WHERE id = ?")
            .bind(reseller)
            .execute(&pool)
            .await
            .unwrap();

        let err = resolve(&pool, id, WithdrawalStatus::Approved, Some("TRX")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(balance_of(&pool, reseller).await, 500.0);
    }

    #[tokio::test]
    async fn resolved_withdrawal_cannot_be_reprocessed() {
        let pool = test_pool().await;
        let reseller = add_reseller(&pool, "rita", 1000.0).await;
        let id = request(&pool, reseller, 600.0).await.unwrap();

        resolve(&pool, id, WithdrawalStatus::Rejected, None).await.unwrap();
        assert_eq!(balance_of(&pool, reseller).await, 1000.0);

        let err = resolve(&pool, id, WithdrawalStatus::Approved, Some("TRX")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(balance_of(&pool, reseller).await, 1000.0);
    }

    #[tokio::test]
    async fn pending_requests_hold_available_balance() {
        let pool = test_pool().await;
        let reseller = add_reseller(&pool, "rita", 1000.0).await;

        request(&pool, reseller, 400.0).await.unwrap();
        // available = 1000 - 400 = 600
        request(&pool, reseller, 400.0).await.unwrap();
        // available = 1000 - 800 = 200
        let err = request(&pool, reseller, 400.0).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn requests_below_minimum_are_rejected() {
        let pool = test_pool().await;
        let reseller = add_reseller(&pool, "rita", 1000.0).await;

        let err = request(&pool, reseller, 499.0).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    async fn register(
        pool: &SqlitePool,
        email: &str,
        referral_code: Option<&str>,
    ) -> Result<i64, AppError> {
        let mut tx = pool.begin().await.unwrap();
        let result = register_reseller(
            &mut tx,
            &NewReseller {
                name: "New Reseller",
                email,
                password_hash: "hash",
                referral_code,
            },
        )
        .await;
        if result.is_ok() {
            tx.commit().await.unwrap();
        }
        result
    }

    #[tokio::test]
    async fn registration_with_code_pays_fixed_bonus_once() {
        let pool = test_pool().await;
        set_setting(&pool, "referral_bonus_type", "fixed").await;
        set_setting(&pool, "referral_bonus_amount", "50").await;

        let referrer = add_reseller(&pool, "ref", 0.0).await;
        sqlx::query("UPDATE resellers SET referral_code = 'FRIEND88' WHERE id = ?")
            .bind(referrer)
            .execute(&pool)
            .await
            .unwrap();

        let new_id = register(&pool, "new@test.local", Some("FRIEND88")).await.unwrap();

        assert_eq!(balance_of(&pool, referrer).await, 50.0);
        let referred_by: Option<i64> =
            sqlx::query_scalar("SELECT referred_by FROM resellers WHERE id = ?")
                .bind(new_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(referred_by, Some(referrer));

        let earnings: Vec<(f64, String)> = sqlx::query_as(
            "SELECT amount, type FROM referral_earnings WHERE referrer_id = ?",
        )
        .bind(referrer)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(earnings, vec![(50.0, "registration".to_string())]);
    }

    #[tokio::test]
    async fn unknown_referral_code_is_ignored() {
        let pool = test_pool().await;
        set_setting(&pool, "referral_bonus_type", "fixed").await;
        set_setting(&pool, "referral_bonus_amount", "50").await;

        let new_id = register(&pool, "new@test.local", Some("NOSUCH99")).await.unwrap();

        let referred_by: Option<i64> =
            sqlx::query_scalar("SELECT referred_by FROM resellers WHERE id = ?")
                .bind(new_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(referred_by, None);

        let earnings: i64 = sqlx::query_scalar("SELECT count(*) FROM referral_earnings")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(earnings, 0);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let pool = test_pool().await;
        register(&pool, "dup@test.local", None).await.unwrap();
        let err = register(&pool, "dup@test.local", None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn generated_codes_are_unique_and_well_formed() {
        let pool = test_pool().await;
        let a = register(&pool, "a@test.local", None).await.unwrap();
        let b = register(&pool, "b@test.local", None).await.unwrap();

        let codes: Vec<Option<String>> =
            sqlx::query_scalar("SELECT referral_code FROM resellers WHERE id IN (?, ?)")
                .bind(a)
                .bind(b)
                .fetch_all(&pool)
                .await
                .unwrap();
        let codes: Vec<String> = codes.into_iter().flatten().collect();
        assert_eq!(codes.len(), 2);
        assert_ne!(codes[0], codes[1]);
        for code in codes {
            assert_eq!(code.len(), 8);
            assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
        }
    }
}
