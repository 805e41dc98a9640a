use actix_web::{http::header::LOCATION, web, HttpResponse, Responder};
use log::{debug, info};
use validator::Validate;

use crate::{
    models::{CreateShortLinkDto, ShortLinkCreatedDto},
    services::{ShortLinkService, ShortLinkServiceTrait},
    types::{AppState, Result},
};

/// Create short link route handler
pub async fn create_handler(
    dto: web::Json<CreateShortLinkDto>,
    service: web::Data<ShortLinkService>,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    let dto = dto.into_inner();
    dto.validate()?;

    let link = service
        .allocate(&dto.long_url, dto.custom_alias.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(ShortLinkCreatedDto::new(&state.base_domain, link)))
}

/// Stats route handler
pub async fn stats_handler(
    path: web::Path<String>,
    service: web::Data<ShortLinkService>,
) -> Result<impl Responder> {
    let link = service.get_stats(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(link))
}

/// Redirect route handler
pub async fn redirect_handler(
    path: web::Path<String>,
    service: web::Data<ShortLinkService>,
) -> Result<impl Responder> {
    let code = path.into_inner();
    debug!("Redirect requested for code: {}", code);

    let link = service.resolve(&code).await?;

    info!("Redirecting '{}' to '{}'", code, link.target);
    Ok(HttpResponse::Found()
        .insert_header((LOCATION, link.target))
        .finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        app::json_config,
        middleware::RateLimit,
        models::ShortLink,
        rate_limit::RateLimiterRegistry,
        repositories::InMemoryShortLinkRepository,
        routes,
    };

    const BASE: &str = "http://sho.rt";

    macro_rules! test_app {
        ($burst:expr) => {{
            let limiter = RateLimiterRegistry::new(1.0, $burst);
            let state = web::Data::new(AppState {
                start_time: Instant::now(),
                version: "test".to_string(),
                base_domain: BASE.to_string(),
                storage_backend: "memory",
                db: None,
                limiter: limiter.clone(),
            });
            let service = web::Data::new(ShortLinkService::new(Arc::new(
                InMemoryShortLinkRepository::new(),
            )));

            test::init_service(
                App::new()
                    .app_data(json_config())
                    .app_data(state)
                    .app_data(service)
                    .configure(|cfg| {
                        routes::configure_routes(cfg, RateLimit::new(limiter, false))
                    }),
            )
            .await
        }};
    }

    fn shorten(body: Value) -> test::TestRequest {
        test::TestRequest::post().uri("/shorten").set_json(body)
    }

    #[actix_web::test]
    async fn test_create_redirect_and_stats() {
        let app = test_app!(10);

        let res = test::call_service(
            &app,
            shorten(json!({"longURL": "https://example.com"})).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: ShortLinkCreatedDto = test::read_body_json(res).await;
        assert_eq!(created.code.len(), 6);
        assert_eq!(created.long_url, "https://example.com");
        assert_eq!(created.short_url, format!("{}/{}", BASE, created.code));

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/{}", created.code))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.headers().get(LOCATION).unwrap().to_str().unwrap(),
            "https://example.com"
        );

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/stats/{}", created.code))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let stats: ShortLink = test::read_body_json(res).await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.target, "https://example.com");
    }

    #[actix_web::test]
    async fn test_duplicate_alias_is_conflict() {
        let app = test_app!(10);

        let body = json!({"longURL": "https://example.com", "customAlias": "docs"});
        let res = test::call_service(&app, shorten(body.clone()).to_request()).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = test::call_service(&app, shorten(body).to_request()).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let error: Value = test::read_body_json(res).await;
        assert_eq!(error["type"], "ALREADY_EXISTS");
        assert_eq!(error["status_code"], 409);
    }

    #[actix_web::test]
    async fn test_unknown_code_is_not_found() {
        let app = test_app!(10);

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/missing").to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/stats/missing").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_invalid_input_is_bad_request() {
        let app = test_app!(10);

        for body in [
            json!({"longURL": ""}),
            json!({"longURL": "ftp://example.com"}),
            json!({"longURL": "https://example.com", "customAlias": "no/slashes"}),
            json!({"longURL": "https://example.com", "customAlias": "stats"}),
            json!({"customAlias": "docs"}),
        ] {
            let res = test::call_service(&app, shorten(body.clone()).to_request()).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body: {body}");
            let error: Value = test::read_body_json(res).await;
            assert_eq!(error["type"], "VALIDATION");
        }
    }

    #[actix_web::test]
    async fn test_create_is_rate_limited_per_client() {
        let app = test_app!(5);
        let from = |ip: &str| {
            test::TestRequest::post()
                .uri("/shorten")
                .peer_addr(format!("{ip}:4000").parse().unwrap())
                .set_json(json!({"longURL": "https://example.com"}))
                .to_request()
        };

        for _ in 0..5 {
            let res = test::call_service(&app, from("10.0.0.1")).await;
            assert_eq!(res.status(), StatusCode::CREATED);
        }

        let res = test::call_service(&app, from("10.0.0.1")).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let error: Value = test::read_body_json(res).await;
        assert_eq!(error["type"], "RATE_LIMITED");

        // Another client still has its own burst
        let res = test::call_service(&app, from("10.0.0.2")).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        // Reads are never limited
        for _ in 0..10 {
            let res =
                test::call_service(&app, test::TestRequest::get().uri("/health").to_request())
                    .await;
            assert_eq!(res.status(), StatusCode::OK);
        }
    }

    #[actix_web::test]
    async fn test_health_reports_tracked_clients() {
        let app = test_app!(5);
        let req = shorten(json!({"longURL": "https://example.com"})).to_request();
        test::call_service(&app, req).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let health: Value = test::read_body_json(res).await;
        assert_eq!(health["storage"], "memory");
        assert_eq!(health["tracked_clients"], 1);
    }
}
