use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{error::ErrorUnauthorized, http::header, Error, HttpMessage};
use futures::future::LocalBoxFuture;
use log::debug;

use crate::auth::config::AuthConfig;
use crate::auth::jwt::verify_token;

/// Attaches a `Principal` to the request when a valid bearer token is
/// presented. An invalid token is rejected outright; an absent one passes
/// through so public endpoints keep working, and protected handlers
/// enforce the principal via extractors.
#[derive(Clone)]
pub struct AuthLayer {
    cfg: AuthConfig,
}

impl AuthLayer {
    pub fn new(cfg: AuthConfig) -> Self {
        Self { cfg }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddleware {
            service: Rc::new(service),
            cfg: self.cfg.clone(),
        }))
    }
}

pub struct AuthMiddleware<S> {
    service: Rc<S>,
    cfg: AuthConfig,
}

impl<S, B> Service<ServiceRequest> for AuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let bearer = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);

        if let Some(token) = bearer {
            match verify_token(&token, &self.cfg) {
                Ok(principal) => {
                    req.extensions_mut().insert(principal);
                }
                Err(e) => {
                    debug!("auth: rejecting bearer token: {}", e);
                    return Box::pin(async move { Err(ErrorUnauthorized("invalid token")) });
                }
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}
