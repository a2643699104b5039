//! Node model for the file tree.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use utoipa::ToSchema;

use super::ROOT_PARENT_ID;

/// Kind of node stored in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Container for other nodes. Has no content.
    Folder,
    /// Generic file.
    File,
    /// Image file.
    Image,
}

impl NodeType {
    /// Get the stored string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Folder => "folder",
            NodeType::File => "file",
            NodeType::Image => "image",
        }
    }

    /// Whether nodes of this type carry blob content.
    pub fn has_content(&self) -> bool {
        !matches!(self, NodeType::Folder)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folder" => Ok(NodeType::Folder),
            "file" => Ok(NodeType::File),
            "image" => Ok(NodeType::Image),
            _ => Err(format!("unknown node type: {s}")),
        }
    }
}

impl TryFrom<String> for NodeType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A stored node record.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Node {
    /// Store-assigned ID (never 0).
    pub id: i64,
    /// Owner user ID.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// Node kind.
    #[sqlx(try_from = "String")]
    pub node_type: NodeType,
    /// Whether non-owners may read the node.
    pub is_public: bool,
    /// Parent folder ID, or `ROOT_PARENT_ID`.
    pub parent_id: i64,
    /// Blob handle for file and image nodes.
    pub local_path: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

impl Node {
    /// Public view of this node, without content.
    pub fn view(&self) -> NodeView {
        NodeView {
            id: self.id,
            user_id: self.user_id,
            name: self.name.clone(),
            node_type: self.node_type,
            is_public: self.is_public,
            parent_id: self.parent_id,
            data: None,
        }
    }
}

/// Data for inserting a node.
#[derive(Debug, Clone)]
pub struct NewNode {
    pub user_id: i64,
    pub name: String,
    pub node_type: NodeType,
    pub is_public: bool,
    pub parent_id: i64,
    pub local_path: Option<String>,
}

/// Node as returned to clients. `localPath` is never exposed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub is_public: bool,
    pub parent_id: i64,
    /// Base64 content, present for file and image nodes when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// A parent reference as supplied by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentRef {
    /// Top of the caller's tree.
    #[default]
    Root,
    /// A specific node ID.
    Id(i64),
    /// A value that cannot name any node.
    Malformed,
}

impl ParentRef {
    /// Parse a textual parent id. `"0"` and empty strings name the root.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return ParentRef::Root;
        }
        match raw.parse::<i64>() {
            Ok(id) => Self::from_id(id),
            Err(_) => ParentRef::Malformed,
        }
    }

    /// Interpret a numeric parent id.
    pub fn from_id(id: i64) -> Self {
        if id == ROOT_PARENT_ID {
            ParentRef::Root
        } else {
            ParentRef::Id(id)
        }
    }
}

/// Input for creating a node.
///
/// Fields are optional so that validation can report the first missing one.
#[derive(Debug, Clone, Default)]
pub struct CreateNode {
    pub name: Option<String>,
    pub node_type: Option<String>,
    pub parent: ParentRef,
    pub is_public: bool,
    /// Base64 content for file and image nodes.
    pub data: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_parse() {
        assert_eq!("folder".parse::<NodeType>().unwrap(), NodeType::Folder);
        assert_eq!("file".parse::<NodeType>().unwrap(), NodeType::File);
        assert_eq!("image".parse::<NodeType>().unwrap(), NodeType::Image);
        assert!("Folder".parse::<NodeType>().is_err());
        assert!("video".parse::<NodeType>().is_err());
        assert!("".parse::<NodeType>().is_err());
    }

    #[test]
    fn test_node_type_has_content() {
        assert!(!NodeType::Folder.has_content());
        assert!(NodeType::File.has_content());
        assert!(NodeType::Image.has_content());
    }

    #[test]
    fn test_parent_ref_parse() {
        assert_eq!(ParentRef::parse("0"), ParentRef::Root);
        assert_eq!(ParentRef::parse(""), ParentRef::Root);
        assert_eq!(ParentRef::parse("12"), ParentRef::Id(12));
        assert_eq!(ParentRef::parse(" 7 "), ParentRef::Id(7));
        assert_eq!(ParentRef::parse("abc"), ParentRef::Malformed);
        assert_eq!(ParentRef::parse("1.5"), ParentRef::Malformed);
    }

    #[test]
    fn test_view_serialization() {
        let view = NodeView {
            id: 3,
            user_id: 1,
            name: "notes.txt".to_string(),
            node_type: NodeType::File,
            is_public: false,
            parent_id: 0,
            data: None,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 3,
                "userId": 1,
                "name": "notes.txt",
                "type": "file",
                "isPublic": false,
                "parentId": 0
            })
        );
    }
}
