//! Shared-secret guard for the users routes.
//!
//! Requests must carry the configured key in the `X-API-KEY` header.
//! Anything else is answered with `401` before reaching a handler.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::Error as DomainError;

/// Header inspected for the shared secret.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Middleware rejecting requests whose `X-API-KEY` does not match.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use users_backend::ApiKey;
///
/// let _app = App::new().service(web::scope("/users").wrap(ApiKey::new("secret")));
/// ```
#[derive(Clone)]
pub struct ApiKey {
    expected: Arc<str>,
}

impl ApiKey {
    /// Guard requests with the given secret.
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: Arc::from(expected.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKey
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyMiddleware {
            service: Rc::new(service),
            expected: Arc::clone(&self.expected),
        }))
    }
}

/// Service wrapper produced by [`ApiKey`].
pub struct ApiKeyMiddleware<S> {
    service: Rc<S>,
    expected: Arc<str>,
}

/// Compare without short-circuiting on the first differing byte.
fn keys_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let authorised = req
            .headers()
            .get(API_KEY_HEADER)
            .is_some_and(|value| keys_match(value.as_bytes(), self.expected.as_bytes()));

        if !authorised {
            warn!(
                method = %req.method(),
                path = %req.path(),
                "rejected request with missing or invalid API key"
            );
            let response = DomainError::unauthorized("Unauthorized").error_response();
            return Box::pin(ready(Ok(req.into_response(response).map_into_right_body())));
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
