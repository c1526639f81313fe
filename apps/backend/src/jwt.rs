use actix_web::body::EitherBody;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, DecodingKey, Validation};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::entity::users;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,   // Subject (external user ID)
    pub email: String, // User email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>, // Display name, if the issuer provides one
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued at
}

/// Bearer-token authentication for everything under `/api`
///
/// Expects `web::Data<DatabaseConnection>` and `web::Data<AppConfig>` to be
/// registered on the app.
#[derive(Clone, Default)]
pub struct JwtAuth;

impl JwtAuth {
    pub fn new() -> Self {
        Self
    }

    pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
        .map(|token_data| token_data.claims)
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    let (req, _pl) = req.into_parts();
    ServiceResponse::new(req, err.error_response()).map_into_right_body()
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
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
        let svc = self.service.clone();

        Box::pin(async move {
            let (db, config) = match (
                req.app_data::<web::Data<DatabaseConnection>>().cloned(),
                req.app_data::<web::Data<AppConfig>>().cloned(),
            ) {
                (Some(db), Some(config)) => (db, config),
                _ => {
                    return Ok(reject(
                        req,
                        AppError::internal("Authentication is not configured"),
                    ))
                }
            };

            // Extract the Authorization header
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_owned);

            let Some(token) = token else {
                return Ok(reject(
                    req,
                    AppError::unauthorized("Missing Authorization header"),
                ));
            };

            let claims = match JwtAuth::verify_token(&token, &config.auth_secret) {
                Ok(claims) => claims,
                Err(e) => {
                    debug!(error = %e, "rejected bearer token");
                    return Ok(reject(req, AppError::unauthorized("Invalid token")));
                }
            };

            // Ensure user exists in database
            let user =
                match crate::user_management::ensure_user_exists(&db, &config, &claims).await {
                    Ok(user) => user,
                    Err(e) => {
                        warn!(error = %e, sub = %claims.sub, "failed to ensure user exists");
                        return Ok(reject(req, AppError::from(e)));
                    }
                };

            if !user.is_active {
                return Ok(reject(
                    req,
                    AppError::forbidden("Your account is awaiting activation"),
                ));
            }

            // Add claims and user to request extensions
            req.extensions_mut().insert(claims);
            req.extensions_mut().insert(user);
            let res = svc.call(req).await?;
            Ok::<_, Error>(res.map_into_left_body())
        })
    }
}

// Helper function to extract claims from request
pub fn get_claims(req: &HttpRequest) -> Option<Claims> {
    req.extensions().get::<Claims>().cloned()
}

// Helper function to extract user from request
pub fn get_user(req: &HttpRequest) -> Option<users::Model> {
    req.extensions().get::<users::Model>().cloned()
}

/// The authenticated user, or `401` when the middleware did not run
pub fn require_user(req: &HttpRequest) -> Result<users::Model, AppError> {
    get_user(req).ok_or_else(|| AppError::unauthorized("User not authenticated"))
}

/// The authenticated user when they are an admin, `403` otherwise
pub fn require_admin(req: &HttpRequest) -> Result<users::Model, AppError> {
    let user = require_user(req)?;
    if user.is_admin {
        Ok(user)
    } else {
        Err(AppError::forbidden("Administrator access required"))
    }
}
