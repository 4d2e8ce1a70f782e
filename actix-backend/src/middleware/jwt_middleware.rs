use std::future::{ready, Ready};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header::{HeaderMap, AUTHORIZATION},
    web, Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    config::IdentityConfig,
    models::{Claims, Identity},
    AppState,
};

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Checks signature, expiry and, when configured, the issuer.
pub fn verify_token(config: &IdentityConfig, token: &str) -> Result<Identity, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    if let Some(issuer) = &config.issuer {
        validation.set_issuer(&[issuer]);
    }

    let data = decode::<Claims>(token, &DecodingKey::from_secret(config.secret.as_bytes()), &validation)?;
    Ok(data.claims.into())
}

/// Attaches the caller's [`Identity`] to requests carrying a valid bearer
/// token. Requests without one pass through anonymously; a bad token is a 401.
#[derive(Clone)]
pub struct Authenticate {
    app_data: web::Data<AppState>,
}

impl Authenticate {
    pub fn new(app_data: web::Data<AppState>) -> Self {
        Self { app_data }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authenticate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateMiddleware {
            service,
            app_data: self.app_data.clone(),
        }))
    }
}

pub struct AuthenticateMiddleware<S> {
    service: S,
    app_data: web::Data<AppState>,
}

impl<S, B> Service<ServiceRequest> for AuthenticateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verified = bearer_token(req.headers()).map(|token| verify_token(&self.app_data.identity, token));

        match verified {
            Some(Ok(identity)) => {
                req.extensions_mut().insert(identity);
            }
            Some(Err(err)) => {
                log::warn!("rejected bearer token on {}: {}", req.path(), err);
                return Box::pin(async { Err(ErrorUnauthorized("Invalid or expired token")) });
            }
            None => {}
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}
