//! File and folder management for filevault.
//!
//! This module provides:
//! - The node model (folders, files and images in a per-user tree)
//! - Blob storage for raw content with UUID handles
//! - The metadata store seam and its SQLite implementation
//! - Ownership and visibility checks
//! - The file manager tying them together

mod guard;
mod metadata;
mod node;
mod service;
mod storage;

pub use guard::{can_modify, can_read};
pub use metadata::{MetadataStore, NodeRepository};
pub use node::{CreateNode, NewNode, Node, NodeType, NodeView, ParentRef};
pub use service::FileManager;
pub use storage::{BlobStore, FileStorage};

/// Parent id used for nodes at the top of a user's tree.
pub const ROOT_PARENT_ID: i64 = 0;

/// Number of nodes per listing page.
pub const PAGE_SIZE: i64 = 20;
