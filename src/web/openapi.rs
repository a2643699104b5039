//! OpenAPI document for the HTTP API.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::file::{NodeType, NodeView};
use crate::web::dto::{
    CreateFileRequest, CreateUserRequest, StatsResponse, StatusResponse, SuccessResponse,
    TokenResponse, UserResponse,
};
use crate::web::handlers;

/// API documentation served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_user,
        handlers::me,
        handlers::connect,
        handlers::disconnect,
        handlers::create_file,
        handlers::get_file,
        handlers::list_files,
        handlers::publish_file,
        handlers::unpublish_file,
        handlers::delete_file,
        handlers::get_file_data,
        handlers::status,
        handlers::stats,
    ),
    components(schemas(
        NodeType,
        NodeView,
        CreateFileRequest,
        CreateUserRequest,
        UserResponse,
        TokenResponse,
        SuccessResponse,
        StatusResponse,
        StatsResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Registration and profile"),
        (name = "sessions", description = "Session tokens"),
        (name = "files", description = "Folders, files and images"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "x_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Token"))),
            );
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}
