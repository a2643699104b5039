//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::db::User;

/// Public user view.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Session token returned by `GET /connect`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Acknowledgement for state-changing file operations.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    /// A successful acknowledgement.
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Service health.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Whether the database answers queries.
    pub db: bool,
}

/// Object counts.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub users: i64,
    pub files: i64,
}
