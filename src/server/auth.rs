//! Bearer-session extraction. Every character-scoped handler goes through
//! [`AuthedUser`]; the character detail view uses [`MaybeUser`] because its
//! payload changes shape for the owner.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::game::{GameError, UserRecord};
use crate::server::error::ApiError;
use crate::server::AppState;

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// The session user. Rejects with 401 unless a live bearer token is
/// presented.
pub struct AuthedUser(pub UserRecord);

impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Err(ApiError(GameError::Unauthorized(
                "missing bearer token".to_string(),
            )));
        };
        let user = state.store.resolve_session(token)?;
        Ok(AuthedUser(user))
    }
}

/// Best-effort session user; never rejects.
pub struct MaybeUser(pub Option<UserRecord>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = bearer_token(parts).and_then(|token| state.store.resolve_session(token).ok());
        Ok(MaybeUser(user))
    }
}
