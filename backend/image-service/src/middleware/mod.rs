/// HTTP middleware utilities for image-service
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, ResponseError};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use crate::error::AppError;

/// Shared-secret check applied to every upload endpoint.
///
/// With no secret configured all requests pass.
#[derive(Clone, Default)]
pub struct UploadAuth {
    secret: Option<Arc<str>>,
}

impl UploadAuth {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.map(Arc::from),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Validate an `Authorization` header value against the configured secret.
    pub fn authorize(&self, header: Option<&str>) -> Result<(), AppError> {
        let Some(secret) = self.secret.as_deref() else {
            return Ok(());
        };

        let token = header
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".to_string()))?;

        if constant_time_compare(token.trim().as_bytes(), secret.as_bytes()) {
            Ok(())
        } else {
            Err(AppError::Unauthorized("Invalid upload secret".to_string()))
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for UploadAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = UploadAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(UploadAuthService {
            service: Rc::new(service),
            auth: self.clone(),
        }))
    }
}

pub struct UploadAuthService<S> {
    service: Rc<S>,
    auth: UploadAuth,
}

impl<S, B> Service<ServiceRequest> for UploadAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let verdict = self.auth.authorize(
            req.headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok()),
        );

        Box::pin(async move {
            if let Err(err) = verdict {
                tracing::warn!(path = %req.path(), "upload rejected: {}", err);
                let response = err.error_response();
                return Ok(req.into_response(response).map_into_right_body());
            }
            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Compare two byte strings in time independent of where they differ
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

pub struct RequestTiming;

impl<S, B> Transform<S, ServiceRequest> for RequestTiming
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTimingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTimingService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestTimingService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestTimingService<S>
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
        let service = self.service.clone();
        let path = req.path().to_string();
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let elapsed = start.elapsed().as_millis();
            tracing::debug!(%method, %path, %elapsed, "request completed");
            res
        })
    }
}
