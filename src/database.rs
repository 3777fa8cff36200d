// src/database.rs
//
// Pool creation, idempotent schema setup and first-run seed data.

use std::str::FromStr;

use bcrypt::{hash, DEFAULT_COST};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS admins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS resellers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password TEXT NOT NULL,
    balance REAL NOT NULL DEFAULT 0,
    referral_code TEXT UNIQUE,
    referred_by INTEGER,
    FOREIGN KEY (referred_by) REFERENCES resellers(id)
);

CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    admin_price REAL NOT NULL,
    stock INTEGER NOT NULL DEFAULT 0,
    image TEXT
);

CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reseller_id INTEGER NOT NULL,
    product_id INTEGER NOT NULL,
    admin_price REAL NOT NULL,
    reseller_price REAL NOT NULL,
    profit REAL NOT NULL,
    customer_name TEXT NOT NULL,
    customer_phone TEXT NOT NULL,
    customer_address TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Pending',
    payment_method TEXT NOT NULL DEFAULT 'cod',
    location TEXT NOT NULL DEFAULT 'inside',
    delivery_charge REAL NOT NULL DEFAULT 0,
    payment_provider TEXT,
    payment_phone TEXT,
    payer_name TEXT,
    transaction_id TEXT,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (reseller_id) REFERENCES resellers(id),
    FOREIGN KEY (product_id) REFERENCES products(id)
);

CREATE TABLE IF NOT EXISTS withdrawals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reseller_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    method TEXT NOT NULL,
    account_number TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Pending',
    transaction_id TEXT,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (reseller_id) REFERENCES resellers(id)
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reseller_id INTEGER NOT NULL,
    sender TEXT NOT NULL,
    content TEXT NOT NULL,
    is_read BOOLEAN NOT NULL DEFAULT 0,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (reseller_id) REFERENCES resellers(id)
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS referral_earnings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    referrer_id INTEGER NOT NULL,
    referred_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    type TEXT NOT NULL,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (referrer_id) REFERENCES resellers(id),
    FOREIGN KEY (referred_id) REFERENCES resellers(id)
);
"#;

pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

/// Seed demo rows so a fresh database is immediately usable. Each block
/// only fires while its table is empty, so restarts never duplicate data.
pub async fn seed(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let settings_count: i64 = sqlx::query_scalar("SELECT count(*) FROM settings")
        .fetch_one(pool)
        .await?;
    if settings_count == 0 {
        let defaults = [
            ("referral_bonus_type", "fixed"),
            ("referral_bonus_amount", "50"),
            ("delivery_charge_advance_inside", "60"),
            ("delivery_charge_advance_outside", "120"),
            ("delivery_charge_cod_inside", "100"),
            ("delivery_charge_cod_outside", "150"),
        ];
        for (key, value) in defaults {
            sqlx::query("INSERT INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(value)
                .execute(pool)
                .await?;
        }
    }

    let admin_count: i64 = sqlx::query_scalar("SELECT count(*) FROM admins")
        .fetch_one(pool)
        .await?;
    if admin_count == 0 {
        let password_hash = hash("admin123", DEFAULT_COST)
            .map_err(|e| sqlx::Error::Protocol(format!("seed hash failed: {e}")))?;
        sqlx::query("INSERT INTO admins (name, email, password) VALUES (?, ?, ?)")
            .bind("Admin")
            .bind("admin@example.com")
            .bind(password_hash)
            .execute(pool)
            .await?;
    }

    let reseller_count: i64 = sqlx::query_scalar("SELECT count(*) FROM resellers")
        .fetch_one(pool)
        .await?;
    if reseller_count == 0 {
        let password_hash = hash("reseller123", DEFAULT_COST)
            .map_err(|e| sqlx::Error::Protocol(format!("seed hash failed: {e}")))?;
        let mut conn = pool.acquire().await?;
        let code = crate::ledger::generate_referral_code(&mut conn)
            .await
            .map_err(|e| sqlx::Error::Protocol(format!("seed referral code failed: {e:?}")))?;
        sqlx::query(
            "INSERT INTO resellers (name, email, password, referral_code) VALUES (?, ?, ?, ?)",
        )
        .bind("Demo Reseller")
        .bind("reseller@example.com")
        .bind(password_hash)
        .bind(code)
        .execute(pool)
        .await?;
    }

    let product_count: i64 = sqlx::query_scalar("SELECT count(*) FROM products")
        .fetch_one(pool)
        .await?;
    if product_count == 0 {
        let samples = [
            (
                "Wireless Earbuds",
                "High quality wireless earbuds with active noise cancellation and 24-hour battery life.",
                1500.0,
                50,
                "https://picsum.photos/seed/earbuds/400/400",
            ),
            (
                "Smart Watch",
                "Fitness tracker and smartwatch with heart rate monitoring and sleep tracking.",
                2500.0,
                30,
                "https://picsum.photos/seed/watch/400/400",
            ),
            (
                "Mechanical Keyboard",
                "RGB mechanical keyboard with tactile blue switches and aluminum frame.",
                3500.0,
                20,
                "https://picsum.photos/seed/keyboard/400/400",
            ),
            (
                "Gaming Mouse",
                "Ergonomic gaming mouse with 16000 DPI optical sensor and customizable RGB lighting.",
                1200.0,
                45,
                "https://picsum.photos/seed/mouse/400/400",
            ),
            (
                "Portable Power Bank",
                "20000mAh fast charging power bank with dual USB outputs and USB-C input.",
                1800.0,
                60,
                "https://picsum.photos/seed/powerbank/400/400",
            ),
        ];
        for (name, description, admin_price, stock, image) in samples {
            sqlx::query(
                "INSERT INTO products (name, description, admin_price, stock, image) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(name)
            .bind(description)
            .bind(admin_price)
            .bind(stock)
            .bind(image)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}
