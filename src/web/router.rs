//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers::{
    connect, create_file, create_user, delete_file, disconnect, get_file, get_file_data,
    list_files, me, publish_file, stats, status, unpublish_file, AppState,
};
use super::middleware::create_cors_layer;
use super::openapi::ApiDoc;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    max_body_bytes: usize,
) -> Router {
    let user_routes = Router::new()
        .route("/users", post(create_user))
        .route("/users/me", get(me));

    let session_routes = Router::new()
        .route("/connect", get(connect))
        .route("/disconnect", get(disconnect));

    let file_routes = Router::new()
        .route("/files", post(create_file).get(list_files))
        .route("/files/:id", get(get_file).delete(delete_file))
        .route("/files/:id/publish", put(publish_file))
        .route("/files/:id/unpublish", put(unpublish_file))
        .route("/files/:id/data", get(get_file_data));

    let health_routes = Router::new()
        .route("/status", get(status))
        .route("/stats", get(stats));

    Router::new()
        .merge(user_routes)
        .merge(session_routes)
        .merge(file_routes)
        .merge(health_routes)
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .with_state(app_state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
