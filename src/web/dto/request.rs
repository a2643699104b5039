//! Request DTOs for Web API.

use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::auth::RegistrationRequest;
use crate::file::{CreateNode, ParentRef};

/// User creation request.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl From<CreateUserRequest> for RegistrationRequest {
    fn from(req: CreateUserRequest) -> Self {
        RegistrationRequest {
            email: req.email,
            password: req.password,
        }
    }
}

/// Node creation request.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// One of `folder`, `file`, `image`.
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    /// Parent folder ID as a number or numeric string. Omitted or `0` means root.
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub parent_id: Option<Value>,
    #[serde(default)]
    pub is_public: Option<bool>,
    /// Base64 content, required for `file` and `image`.
    #[serde(default)]
    pub data: Option<String>,
}

impl CreateFileRequest {
    fn parent_ref(&self) -> ParentRef {
        match &self.parent_id {
            None | Some(Value::Null) => ParentRef::Root,
            Some(Value::Number(n)) => n.as_i64().map_or(ParentRef::Malformed, ParentRef::from_id),
            Some(Value::String(s)) => ParentRef::parse(s),
            Some(_) => ParentRef::Malformed,
        }
    }
}

impl From<CreateFileRequest> for CreateNode {
    fn from(req: CreateFileRequest) -> Self {
        let parent = req.parent_ref();
        CreateNode {
            name: req.name,
            node_type: req.node_type,
            parent,
            is_public: req.is_public.unwrap_or(false),
            data: req.data,
        }
    }
}

/// Query parameters for listing nodes.
///
/// Both are kept as text: an unparseable `page` falls back to 0 and an
/// unparseable `parentId` yields an empty listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListFilesQuery {
    /// Parent folder ID (default root).
    pub parent_id: Option<String>,
    /// Zero-based page number.
    pub page: Option<String>,
}

impl ListFilesQuery {
    /// Parent to list under.
    pub fn parent(&self) -> ParentRef {
        self.parent_id
            .as_deref()
            .map_or(ParentRef::Root, ParentRef::parse)
    }

    /// Requested page.
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0)
    }
}
