// src/dtos/product.rs
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub admin_price: f64,
    pub stock: i64,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub admin_price: Option<f64>,
    pub stock: Option<i64>,
    pub image: Option<String>,
}
