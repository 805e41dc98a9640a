use actix_web::web;

use crate::{
    handlers::{create_handler, redirect_handler, stats_handler},
    middleware::RateLimit,
};

// Configure short link routes; the catch-all redirect must stay last
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: RateLimit) {
    cfg.service(
        web::resource("/shorten")
            .wrap(limiter)
            .route(web::post().to(create_handler)),
    )
    .route("/stats/{code}", web::get().to(stats_handler))
    .route("/{code}", web::get().to(redirect_handler));
}
