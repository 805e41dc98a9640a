use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{db::Database, errors::AppError, rate_limit::RateLimiterRegistry};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub storage_healthy: bool,
    pub uptime_seconds: u64,
    pub tracked_clients: usize,
}

// Define an AppState struct to hold shared application state
pub struct AppState {
    pub start_time: Instant,
    pub version: String,
    pub base_domain: String,
    pub storage_backend: &'static str,
    /// Present only for the PostgreSQL backend
    pub db: Option<Database>,
    pub limiter: RateLimiterRegistry,
}
