use actix_web::{web, HttpResponse, Responder};

use crate::{
    middleware::RateLimit,
    types::{AppState, HealthStatus},
};

pub mod short_link;

// Handler function for the health check endpoint
async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let storage_healthy = match &data.db {
        Some(db) => db.ping().await,
        None => true,
    };

    let status = HealthStatus {
        status: if storage_healthy { "OK" } else { "DEGRADED" }.to_string(),
        version: data.version.clone(),
        storage: data.storage_backend.to_string(),
        storage_healthy,
        uptime_seconds: data.start_time.elapsed().as_secs(),
        tracked_clients: data.limiter.len(),
    };

    if storage_healthy {
        HttpResponse::Ok().json(status)
    } else {
        HttpResponse::ServiceUnavailable().json(status)
    }
}

// Configure all routes function
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: RateLimit) {
    cfg.route("/health", web::get().to(health_check));
    short_link::configure_routes(cfg, limiter);
}
