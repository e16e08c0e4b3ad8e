use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashSet;
use thiserror::Error;

use super::api::error::ErrorResponse;
use super::config::Permission;
use super::state::AppState;

/// Operator identified by a configured API key.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub name: String,
    pub permissions: HashSet<Permission>,
}

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingAuth,
    #[error("expected `Authorization: Bearer <key>`")]
    InvalidFormat,
    #[error("unknown API key")]
    InvalidKey,
}

impl AuthError {
    fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuth => "missing_api_key",
            AuthError::InvalidFormat => "malformed_authorization",
            AuthError::InvalidKey => "unknown_api_key",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::with_message(self.code(), &self.to_string());
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
#[error("{0:?} permission required")]
pub struct PermissionError(pub Permission);

impl IntoResponse for PermissionError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::with_message("insufficient_permissions", &self.to_string());
        (StatusCode::FORBIDDEN, Json(body)).into_response()
    }
}

fn bearer_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingAuth)?;
    let value = value.to_str().map_err(|_| AuthError::InvalidFormat)?;
    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(AuthError::InvalidFormat),
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = bearer_key(&parts.headers)?;
        let api_key = state.config.find_api_key(key).ok_or_else(|| {
            log::warn!("Rejected request to {} with an unknown API key", parts.uri.path());
            AuthError::InvalidKey
        })?;

        Ok(AuthenticatedUser {
            name: api_key.name.clone(),
            permissions: api_key.permissions.clone(),
        })
    }
}

/// Read covers catalog, ranking, paths and status. Control covers anything
/// that moves the mount or changes shared state.
pub fn require_permission(
    user: &AuthenticatedUser,
    permission: Permission,
) -> Result<(), PermissionError> {
    if user.permissions.contains(&permission) {
        Ok(())
    } else {
        log::warn!("{} lacks {:?} permission", user.name, permission);
        Err(PermissionError(permission))
    }
}
