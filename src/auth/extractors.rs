use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use tracing::warn;
use uuid::Uuid;

use super::{cookie::SESSION_COOKIE, jwt::JwtKeys};
use crate::error::ApiError;

/// Extracts and validates the session cookie, yielding the verified user ID.
///
/// The verified ID is never checked for ownership against the resource being
/// mutated; the catalog is shared between all authenticated users.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| ApiError::unauthorized("No token provided."))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::unauthorized("Invalid token.")
        })?;

        Ok(AuthUser(claims.sub))
    }
}
