//! File handlers for Web API.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};

use crate::file::NodeView;
use crate::web::dto::{CreateFileRequest, JsonBody, ListFilesQuery, SuccessResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

/// Parse a path ID. Anything that is not an integer names no node.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found())
}

/// Generate a safe Content-Disposition header value for inline content.
///
/// Control characters are dropped, and quotes and backslashes replaced,
/// in the plain `filename` parameter. Non-ASCII names also get an RFC 5987
/// `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let needs_encoding = !filename.is_ascii()
        || filename.chars().any(|c| c.is_control() || c == '"' || c == '\\');

    if !needs_encoding {
        return format!("inline; filename=\"{}\"", filename);
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!(
        "inline; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// POST /files - Create a folder, file or image.
#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    request_body = CreateFileRequest,
    responses(
        (status = 201, description = "Node created", body = NodeView),
        (status = 400, description = "Missing name, Missing type, Missing data or Parent not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("x_token" = [])
    )
)]
pub async fn create_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    JsonBody(req): JsonBody<CreateFileRequest>,
) -> Result<(StatusCode, Json<NodeView>), ApiError> {
    let view = state.files.create_node(auth.user_id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /files/:id - Get a node, with base64 content for files and images.
///
/// Public nodes are readable without a token.
#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "Node ID")
    ),
    responses(
        (status = 200, description = "Node", body = NodeView),
        (status = 401, description = "Token present but invalid"),
        (status = 404, description = "File not found")
    ),
    security(
        (),
        ("x_token" = [])
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(caller): OptionalAuthUser,
    Path(id): Path<String>,
) -> Result<Json<NodeView>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.files.get_node(caller, id).await?))
}

/// GET /files - List the caller's nodes under a parent.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "One page of nodes", body = Vec<NodeView>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("x_token" = [])
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<Vec<NodeView>>, ApiError> {
    let nodes = state
        .files
        .list_nodes(auth.user_id, query.parent(), Some(query.page()))
        .await?;
    Ok(Json(nodes))
}

/// PUT /files/:id/publish - Make a node readable by everyone.
#[utoipa::path(
    put,
    path = "/files/{id}/publish",
    tag = "files",
    params(
        ("id" = i64, Path, description = "Node ID")
    ),
    responses(
        (status = 200, description = "Published", body = SuccessResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("x_token" = [])
    )
)]
pub async fn publish_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.files.set_visibility(auth.user_id, id, true).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// PUT /files/:id/unpublish - Make a node private to its owner.
#[utoipa::path(
    put,
    path = "/files/{id}/unpublish",
    tag = "files",
    params(
        ("id" = i64, Path, description = "Node ID")
    ),
    responses(
        (status = 200, description = "Unpublished", body = SuccessResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("x_token" = [])
    )
)]
pub async fn unpublish_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.files.set_visibility(auth.user_id, id, false).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /files/:id - Delete a node. Folder children are kept.
#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "Node ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("x_token" = [])
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.files.delete_node(auth.user_id, id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /files/:id/data - Raw content of a file or image.
#[utoipa::path(
    get,
    path = "/files/{id}/data",
    tag = "files",
    params(
        ("id" = i64, Path, description = "Node ID")
    ),
    responses(
        (status = 200, description = "Raw content, typed by the node name"),
        (status = 400, description = "A folder doesn't have content"),
        (status = 401, description = "Token present but invalid"),
        (status = 404, description = "File not found")
    ),
    security(
        (),
        ("x_token" = [])
    )
)]
pub async fn get_file_data(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(caller): OptionalAuthUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let (node, content) = state.files.get_content(caller, id).await?;

    let content_type = mime_guess::from_path(&node.name)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&node.name),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}
