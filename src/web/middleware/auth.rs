//! Session token extractors.
//!
//! The token travels in the `X-Token` header and is resolved through the
//! session authority held in [`AppState`].

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "x-token";

fn header_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

async fn resolve(state: &AppState, token: &str) -> Result<i64, ApiError> {
    state
        .sessions
        .resolve(token)
        .await?
        .ok_or_else(ApiError::unauthorized)
}

/// Extractor for authenticated users.
///
/// Rejects with 401 when the token is missing or does not resolve.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Resolved user ID.
    pub user_id: i64,
    /// The raw token, for revocation.
    pub token: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = header_token(parts).ok_or_else(ApiError::unauthorized)?;
        let user_id = resolve(state, &token).await?;

        Ok(AuthUser { user_id, token })
    }
}

/// Optional authentication extractor.
///
/// A missing token means an anonymous caller. A token that is present but
/// does not resolve is still rejected with 401.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<i64>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match header_token(parts) {
            Some(token) => Ok(OptionalAuthUser(Some(resolve(state, &token).await?))),
            None => Ok(OptionalAuthUser(None)),
        }
    }
}
