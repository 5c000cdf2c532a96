//! Bearer-token authentication.
//!
//! Every authenticated route takes an [`AuthUser`] argument; the extractor
//! reads the `Authorization: Bearer <token>` header and resolves it against
//! the `users.api_token` column. Tokens are opaque UUIDs issued once at
//! user creation.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::api::SharedState;
use crate::error::DomainError;
use crate::models::User;

/// The authenticated caller, resolved from the bearer token.
pub struct AuthUser(pub User);

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = DomainError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                DomainError::Unauthorized("Missing authorization header".into())
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                DomainError::Unauthorized("Invalid authorization header format".into())
            })?
            .trim()
            .to_string();

        let user = state
            .db
            .call(move |db| db.user_by_token(&token))
            .await?
            .ok_or_else(|| DomainError::Unauthorized("Invalid or expired token".into()))?;

        Ok(AuthUser(user))
    }
}
