use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth;
use crate::database::{self, models::user::PublicUser};
use crate::error::ApiError;

/// Authenticated user context, resolved once by the token gate and passed to
/// workflows through request extensions.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<PublicUser> for AuthUser {
    fn from(user: PublicUser) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Token-gate middleware for owner-scoped routes: rejects requests without a
/// valid bearer token and exposes the resolved identity downstream.
pub async fn token_gate(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = resolve_bearer(&headers).await?;
    request.extensions_mut().insert(AuthUser::from(user));
    Ok(next.run(request).await)
}

/// Shared verification path: extract bearer token, verify signature and
/// expiry, resolve the subject to a live user row.
///
/// 401 for a missing/invalid/expired token, 404 when the decoded subject no
/// longer resolves to a user.
pub async fn resolve_bearer(headers: &HeaderMap) -> Result<PublicUser, ApiError> {
    let token =
        extract_bearer(headers).ok_or_else(|| ApiError::unauthorized("No token provided"))?;

    let claims = auth::validate_jwt(&token).map_err(ApiError::unauthorized)?;

    let pool = database::pool().await?;
    database::users::find_public_by_id(&pool, claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))?;

    let auth_str = auth_header.to_str().ok()?;
    auth_str
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
