use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use serde::Serialize;

use crate::auth::{Claims, TokenCodec};
use crate::error::ApiError;
use crate::types::Role;

/// Authenticated principal extracted from the session token
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Resolve the request's principal, if any
///
/// Missing, malformed and expired tokens all yield `None`.
pub fn authenticate(headers: &HeaderMap, codec: &TokenCodec, cookie_name: &str) -> Option<AuthUser> {
    let token = extract_token(headers, cookie_name)?;
    match codec.decode(&token) {
        Ok(claims) => Some(AuthUser::from(claims)),
        Err(e) => {
            tracing::debug!("Rejected session token: {}", e);
            None
        }
    }
}

/// Session cookie first, then `Authorization: Bearer`
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    token_from_cookies(headers, cookie_name).or_else(|| token_from_bearer(headers))
}

fn token_from_cookies(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn token_from_bearer(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Handlers behind the route guard take `AuthUser` directly
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
