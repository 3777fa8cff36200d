// src/state.rs
use sqlx::SqlitePool;

use crate::notify::EventHub;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub events: EventHub,
}

impl AppState {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            db_pool,
            events: EventHub::new(),
        }
    }
}
