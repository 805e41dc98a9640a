use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, ResponseError};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::warn;

use crate::errors::AppError;
use crate::rate_limit::RateLimiterRegistry;

/// Identity shared by requests whose peer address is unknown
const UNKNOWN_CLIENT: &str = "unknown";

/// Rejects requests with 429 once the client's token bucket is empty
pub struct RateLimit {
    limiter: RateLimiterRegistry,
    trust_proxy_headers: bool,
}

impl RateLimit {
    pub fn new(limiter: RateLimiterRegistry, trust_proxy_headers: bool) -> Self {
        Self {
            limiter,
            trust_proxy_headers,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimitMiddleware {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            trust_proxy_headers: self.trust_proxy_headers,
        })
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limiter: RateLimiterRegistry,
    trust_proxy_headers: bool,
}

impl<S> RateLimitMiddleware<S> {
    fn client_identity(&self, req: &ServiceRequest) -> String {
        if self.trust_proxy_headers {
            if let Some(addr) = req.connection_info().realip_remote_addr() {
                return addr.to_string();
            }
        }

        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let identity = self.client_identity(&req);

        if !self.limiter.allow(&identity) {
            warn!("Rate limit exceeded for {} on {}", identity, req.path());
            let response = AppError::RateLimited(
                "Too many requests, please try again later".to_string(),
            )
            .error_response()
            .map_into_right_body();
            let (request, _payload) = req.into_parts();
            return Box::pin(async move { Ok(ServiceResponse::new(request, response)) });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
