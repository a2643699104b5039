//! Session handlers: `/connect` and `/disconnect`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};

use crate::web::dto::TokenResponse;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /connect - Exchange HTTP Basic credentials for a session token.
#[utoipa::path(
    get,
    path = "/connect",
    tag = "sessions",
    responses(
        (status = 200, description = "Session token", body = TokenResponse),
        (status = 401, description = "Missing or wrong credentials")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn connect(
    State(state): State<Arc<AppState>>,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
) -> Result<Json<TokenResponse>, ApiError> {
    let TypedHeader(Authorization(basic)) = credentials.ok_or_else(ApiError::unauthorized)?;

    let token = state
        .sessions
        .connect(basic.username(), basic.password())
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    Ok(Json(TokenResponse { token }))
}

/// GET /disconnect - Revoke the current session token.
#[utoipa::path(
    get,
    path = "/disconnect",
    tag = "sessions",
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("x_token" = [])
    )
)]
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<StatusCode, ApiError> {
    if !state.sessions.revoke(&auth.token).await? {
        return Err(ApiError::unauthorized());
    }
    Ok(StatusCode::NO_CONTENT)
}
