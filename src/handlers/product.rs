// src/handlers/product.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use crate::dtos::product::{CreateProductRequest, UpdateProductRequest};
use crate::error::AppError;
use crate::models::product::Product;
use crate::state::AppState;

const DEFAULT_IMAGE: &str = "https://picsum.photos/seed/product/400/400";

// GET /api/admin/products - full catalog, newest first
#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY id DESC")
        .fetch_all(&state.db_pool)
        .await?;
    Ok(Json(products))
}

// POST /api/admin/products
#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Product name required"));
    }
    if payload.admin_price < 0.0 {
        return Err(AppError::validation("Price cannot be negative"));
    }
    if payload.stock < 0 {
        return Err(AppError::validation("Stock cannot be negative"));
    }

    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (name, description, admin_price, stock, image) \
         VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(payload.admin_price)
    .bind(payload.stock)
    .bind(payload.image.as_deref().unwrap_or(DEFAULT_IMAGE))
    .fetch_one(&state.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// PUT /api/admin/products/:id - partial update, absent fields keep their value
#[instrument(skip(state, payload), fields(id))]
pub async fn update_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>, AppError> {
    if payload.admin_price.is_some_and(|p| p < 0.0) {
        return Err(AppError::validation("Price cannot be negative"));
    }
    if payload.stock.is_some_and(|s| s < 0) {
        return Err(AppError::validation("Stock cannot be negative"));
    }

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET \
         name = COALESCE(?, name), \
         description = COALESCE(?, description), \
         admin_price = COALESCE(?, admin_price), \
         stock = COALESCE(?, stock), \
         image = COALESCE(?, image) \
         WHERE id = ? RETURNING *",
    )
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.admin_price)
    .bind(payload.stock)
    .bind(payload.image)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(product))
}

// DELETE /api/admin/products/:id
#[instrument(skip(state), fields(id))]
pub async fn delete_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Product not found"));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

// GET /api/reseller/products - only what can still be ordered
#[instrument(skip(state))]
pub async fn available_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE stock > 0 ORDER BY id DESC")
            .fetch_all(&state.db_pool)
            .await?;
    Ok(Json(products))
}
