//! Caller extraction from the `Authorization: Bearer <token>` header.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use kanban_core::authorization::Actor;
use kanban_core::error::CoreError;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::state::AppState;

/// The calling [`Actor`]. Handlers pass it straight into the kanban service,
/// which runs the authorization gate.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Actor);

fn bearer_token(parts: &Parts) -> Result<&str, CoreError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Missing Authorization header".into()))?;

    header.strip_prefix("Bearer ").ok_or_else(|| {
        CoreError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = verify_token(token, &state.config.jwt)
            .map_err(|_| CoreError::Unauthorized("Invalid or expired token".into()))?;
        Ok(AuthUser(claims.actor()))
    }
}
