use std::{sync::Arc, time::Instant};

use actix_cors::Cors;
use actix_web::{
    dev::Service as _,
    http::header::{HeaderName, HeaderValue},
    middleware::Logger,
    web, App, HttpServer,
};
use env_logger::Env;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::{Config, Environment, StorageBackend},
    db::Database,
    errors::AppError,
    middleware::RateLimit,
    rate_limit::RateLimiterRegistry,
    repositories::{
        InMemoryShortLinkRepository, PostgresShortLinkRepository, ShortLinkRepositoryTrait,
    },
    routes,
    services::ShortLinkService,
    types::AppState,
};

// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;

/// Largest accepted JSON body
const JSON_PAYLOAD_LIMIT: usize = 32 * 1024;

const REQUEST_ID_HEADER: &str = "x-request-id";

// Setup logging with custom format and configuration
fn setup_logging(config: &Config) -> AppResult<()> {
    let log_level = match config.app.environment {
        Environment::Development => config.app.log_level.clone(),
        Environment::Testing => "debug,actix_web=info".to_string(),
        Environment::Production => "info,actix_web=warn".to_string(),
    };

    let env = Env::default()
        .filter_or("RUST_LOG", log_level)
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::try_init_from_env(env)
        .map_err(|e| AppError::Logger(format!("Failed to initialize logger: {}", e)))
}

/// JSON extractor settings; body errors use the standard error response
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_PAYLOAD_LIMIT)
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

async fn build_repository(
    config: &Config,
) -> AppResult<(Arc<dyn ShortLinkRepositoryTrait>, Option<Database>)> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.storage).await?;
            let repository: Arc<dyn ShortLinkRepositoryTrait> =
                Arc::new(PostgresShortLinkRepository::new(&db));
            Ok((repository, Some(db)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; short links will not survive a restart");
            let repository: Arc<dyn ShortLinkRepositoryTrait> =
                Arc::new(InMemoryShortLinkRepository::new());
            Ok((repository, None))
        }
    }
}

pub async fn server() -> AppResult<()> {
    // Load application configuration
    let config = Config::load()?;

    setup_logging(&config)?;

    let start_time = Instant::now();

    info!("Starting {} v{}", config.app.name, config.app.version);
    info!("Environment: {:?}", config.app.environment);
    info!(
        "Binding to {}:{} with {} workers",
        config.server.host, config.server.port, config.server.workers
    );

    if config.app.environment == Environment::Development {
        debug!("Full configuration: {:?}", config);
    }

    let (repository, db) = build_repository(&config).await?;
    let service = web::Data::new(ShortLinkService::new(repository));

    let limiter = RateLimiterRegistry::new(
        config.rate_limit.refill_per_second(),
        config.rate_limit.burst,
    );
    info!(
        "Rate limiting POST /shorten to {} requests per {}s (burst {}) per client",
        config.rate_limit.requests, config.rate_limit.period_seconds, config.rate_limit.burst
    );
    let sweeper = limiter.spawn_sweeper(config.rate_limit.sweep_interval());
    let trust_proxy_headers = config.rate_limit.trust_proxy_headers;

    let state = web::Data::new(AppState {
        start_time,
        version: config.app.version.clone(),
        base_domain: config.app.base_domain.clone(),
        storage_backend: config.storage.backend.as_str(),
        db: db.clone(),
        limiter: limiter.clone(),
    });

    let log_format = if config.app.environment == Environment::Production {
        "%a \"%r\" %s %b %T"
    } else {
        "%a \"%r\" %s %b %T \"%{Referer}i\" \"%{User-Agent}i\" %{X-Request-ID}o"
    };

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(json_config())
            .app_data(state.clone())
            .app_data(service.clone())
            // Tag every response with a fresh request ID
            .wrap_fn(|req, srv| {
                let request_id = Uuid::new_v4().to_string();
                let fut = srv.call(req);
                async move {
                    let mut res = fut.await?;
                    if let Ok(value) = HeaderValue::from_str(&request_id) {
                        res.headers_mut()
                            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                    }
                    Ok::<_, actix_web::Error>(res)
                }
            })
            .wrap(Logger::new(log_format))
            .wrap(cors)
            .configure(|cfg| {
                routes::configure_routes(cfg, RateLimit::new(limiter.clone(), trust_proxy_headers))
            })
    })
    .workers(config.server.workers)
    .bind((config.server.host.to_string(), config.server.port))?
    .run()
    .await?;

    sweeper.abort();
    if let Some(db) = db {
        db.shutdown().await;
    }

    info!("Server stopped");
    Ok(())
}
