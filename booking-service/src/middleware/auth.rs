//! Bearer-token authentication.
//!
//! Tokens are issued by the platform auth service; this service only
//! validates them (HS256, shared secret) and trusts the identity inside.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{services::error::AppError, AppState};

/// Access-token claims as issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// The authenticated caller, parsed once per request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Unauthenticated(anyhow::anyhow!("Missing or invalid Authorization header"))
        })?;

    let decoding_key =
        DecodingKey::from_secret(state.config.auth.jwt_secret.expose_secret().as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|_| AppError::Unauthenticated(anyhow::anyhow!("Invalid or expired token")))?;

    let user_id = Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::Unauthenticated(anyhow::anyhow!("Malformed subject claim")))?;

    req.extensions_mut().insert(AuthUser {
        id: user_id,
        email: token_data.claims.email,
    });

    Ok(next.run(req).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            AppError::Unauthenticated(anyhow::anyhow!("Caller identity missing from request"))
        })
    }
}
