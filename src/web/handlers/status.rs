//! Health handlers.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::db::UserRepository;
use crate::web::dto::{StatsResponse, StatusResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /status - Database liveness.
#[utoipa::path(
    get,
    path = "/status",
    tag = "health",
    responses(
        (status = 200, description = "Service status", body = StatusResponse)
    )
)]
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        db: state.db.is_alive().await,
    })
}

/// GET /stats - User and node counts.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "health",
    responses(
        (status = 200, description = "Object counts", body = StatsResponse)
    )
)]
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let users = UserRepository::new(state.db.pool()).count().await?;
    let files = state.files.count_nodes().await?;

    Ok(Json(StatsResponse { users, files }))
}
