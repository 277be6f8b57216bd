use crate::errors::ServiceError;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures_util::future::LocalBoxFuture;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter as GovernorRateLimiter};
use std::future::{ready, Ready};
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;
use std::rc::Rc;
use std::sync::Arc;

/// Paths never subject to rate limiting
const EXEMPT_PATHS: [&str; 3] = ["/health", "/api/ping", "/metrics"];

/// Tracked clients before idle entries are evicted
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Per-client-IP quota, shared by every worker it is cloned into
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: NonZeroU32) -> Self {
        let quota = Quota::per_minute(requests_per_minute);
        Self {
            limiter: Arc::new(GovernorRateLimiter::keyed(quota)),
        }
    }

    /// Take one cell from the client's bucket
    fn admit(&self, client: IpAddr) -> bool {
        if self.limiter.len() > MAX_TRACKED_CLIENTS {
            self.limiter.retain_recent();
        }
        self.limiter.check_key(&client).is_ok()
    }
}

/// Peer address of the connection; forwarding headers are not trusted
fn client_ip(req: &ServiceRequest) -> IpAddr {
    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimiterMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service: Rc::new(service),
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterMiddleware<S> {
    service: Rc<S>,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if EXEMPT_PATHS.contains(&req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await });
        }

        let client = client_ip(&req);
        if self.limiter.admit(client) {
            let fut = self.service.call(req);
            Box::pin(async move { fut.await })
        } else {
            tracing::warn!(path = req.path(), client = %client, "Rate limit exceeded");
            let err: Error = ServiceError::RateLimited.into();
            Box::pin(async move { Err(err) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{dev::Service as _, http::StatusCode, test, web, App, HttpResponse};
    use std::net::SocketAddr;

    fn request_from(ip: [u8; 4]) -> test::TestRequest {
        test::TestRequest::get()
            .uri("/api/v1/risk/features")
            .peer_addr(SocketAddr::from((ip, 40000)))
    }

    #[actix_web::test]
    async fn test_limits_each_client_separately() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimiter::new(NonZeroU32::new(2).unwrap()))
                .route(
                    "/api/v1/risk/features",
                    web::get().to(|| async { HttpResponse::Ok().finish() }),
                )
                .route(
                    "/health",
                    web::get().to(|| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;

        for _ in 0..2 {
            let resp = app.call(request_from([10, 0, 0, 1]).to_request()).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let err = app.call(request_from([10, 0, 0, 1]).to_request()).await.err().unwrap();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );

        // another client keeps its own quota
        let resp = app.call(request_from([10, 0, 0, 2]).to_request()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/health")
            .peer_addr(SocketAddr::from(([10, 0, 0, 1], 40000)))
            .to_request();
        let resp = app.call(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[::core::prelude::v1::test]
    fn test_clones_share_quota() {
        let limiter = RateLimiter::new(NonZeroU32::new(1).unwrap());
        let worker = limiter.clone();
        let client = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 7));

        assert!(limiter.admit(client));
        assert!(!worker.admit(client));
    }
}
