//! File manager: the operations behind the `/files` endpoints.
//!
//! Identity is resolved by the caller and passed in as a user ID. Every
//! check that fails because the caller may not see a node is reported as
//! `NotFound("file")`, the same error as for a missing node.

use std::sync::Arc;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use tracing::{debug, info, warn};

use super::guard::{can_modify, can_read};
use super::metadata::MetadataStore;
use super::node::{CreateNode, NewNode, Node, NodeType, NodeView, ParentRef};
use super::storage::BlobStore;
use super::{PAGE_SIZE, ROOT_PARENT_ID};
use crate::{Result, VaultError};

/// Standard alphabet, padding optional on input.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

fn not_found() -> VaultError {
    VaultError::NotFound("file".to_string())
}

/// File manager over injected metadata and blob stores.
#[derive(Clone)]
pub struct FileManager {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
}

impl FileManager {
    /// Create a new FileManager.
    pub fn new(metadata: Arc<dyn MetadataStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { metadata, blobs }
    }

    /// Create a folder, file or image owned by `owner`.
    ///
    /// Validation stops at the first failure, in this order: name, type,
    /// data (non-folders only), parent. For file and image nodes the content
    /// is written to the blob store before the metadata record.
    pub async fn create_node(&self, owner: i64, request: CreateNode) -> Result<NodeView> {
        let name = request
            .name
            .filter(|n| !n.is_empty())
            .ok_or(VaultError::MissingField("name"))?;

        let node_type = request
            .node_type
            .as_deref()
            .and_then(|t| t.parse::<NodeType>().ok())
            .ok_or(VaultError::MissingField("type"))?;

        let content = if node_type.has_content() {
            let data = request
                .data
                .filter(|d| !d.is_empty())
                .ok_or(VaultError::MissingField("data"))?;
            let bytes = BASE64
                .decode(data.as_bytes())
                .map_err(|_| VaultError::MissingField("data"))?;
            Some((data, bytes))
        } else {
            None
        };

        let parent_id = self.resolve_parent(owner, request.parent).await?;

        let (echo, local_path) = match content {
            Some((data, bytes)) => {
                let handle = self.blobs.put(&bytes).await?;
                debug!("Stored {} bytes as blob {}", bytes.len(), handle);
                (Some(data), Some(handle))
            }
            None => (None, None),
        };

        let new_node = NewNode {
            user_id: owner,
            name,
            node_type,
            is_public: request.is_public,
            parent_id,
            local_path,
        };

        let node = match self.metadata.insert(&new_node).await {
            Ok(node) => node,
            Err(e) => {
                if let Some(handle) = &new_node.local_path {
                    warn!("Metadata write failed, blob {} is orphaned: {}", handle, e);
                }
                return Err(e);
            }
        };

        info!(
            "User {} created {} {} ({})",
            owner, node.node_type, node.id, node.name
        );

        let mut view = node.view();
        view.data = echo;
        Ok(view)
    }

    /// Get a node visible to `caller`, with base64 content for files and images.
    pub async fn get_node(&self, caller: Option<i64>, id: i64) -> Result<NodeView> {
        let node = self.readable_node(caller, id).await?;

        let mut view = node.view();
        if let Some(handle) = &node.local_path {
            let bytes = self.blobs.get(handle).await?;
            view.data = Some(BASE64.encode(bytes));
        }
        Ok(view)
    }

    /// Get the raw content of a file or image visible to `caller`.
    pub async fn get_content(&self, caller: Option<i64>, id: i64) -> Result<(Node, Vec<u8>)> {
        let node = self.readable_node(caller, id).await?;

        let handle = match (&node.node_type, &node.local_path) {
            (NodeType::Folder, _) => return Err(VaultError::FolderHasNoContent),
            (_, Some(handle)) => handle.clone(),
            (_, None) => return Err(not_found()),
        };

        let bytes = self.blobs.get(&handle).await?;
        Ok((node, bytes))
    }

    /// List one page of the owner's nodes directly under `parent`.
    ///
    /// Pages are zero-based. A parent that is malformed, unknown, a file,
    /// or someone else's folder yields an empty list.
    pub async fn list_nodes(
        &self,
        owner: i64,
        parent: ParentRef,
        page: Option<i64>,
    ) -> Result<Vec<NodeView>> {
        let parent_id = match parent {
            ParentRef::Root => ROOT_PARENT_ID,
            ParentRef::Id(id) => id,
            ParentRef::Malformed => return Ok(Vec::new()),
        };
        let page = page.unwrap_or(0).max(0);
        let skip = page.saturating_mul(PAGE_SIZE);

        let nodes = self
            .metadata
            .list_by_parent(owner, parent_id, skip, PAGE_SIZE)
            .await?;

        Ok(nodes.iter().map(Node::view).collect())
    }

    /// Publish or unpublish an owned node. Idempotent.
    pub async fn set_visibility(&self, owner: i64, id: i64, is_public: bool) -> Result<()> {
        let node = self.owned_node(owner, id).await?;

        if !self.metadata.set_public(node.id, is_public).await? {
            return Err(not_found());
        }

        debug!("Node {} is_public={}", node.id, is_public);
        Ok(())
    }

    /// Delete an owned node and its blob.
    ///
    /// Children of a deleted folder are left in place.
    pub async fn delete_node(&self, owner: i64, id: i64) -> Result<()> {
        let node = self.owned_node(owner, id).await?;

        if !self.metadata.delete(node.id).await? {
            return Err(not_found());
        }

        if let Some(handle) = &node.local_path {
            match self.blobs.delete(handle).await {
                Ok(true) => {}
                Ok(false) => warn!("Blob {} for node {} was already gone", handle, node.id),
                Err(e) => warn!("Failed to delete blob {} for node {}: {}", handle, node.id, e),
            }
        }

        info!("User {} deleted {} {}", owner, node.node_type, node.id);
        Ok(())
    }

    /// Count all stored nodes.
    pub async fn count_nodes(&self) -> Result<i64> {
        self.metadata.count().await
    }

    /// A parent must be a folder owned by `owner`. Anything else, including
    /// another user's folder, is `ParentNotFound`.
    async fn resolve_parent(&self, owner: i64, parent: ParentRef) -> Result<i64> {
        let id = match parent {
            ParentRef::Root => return Ok(ROOT_PARENT_ID),
            ParentRef::Id(id) => id,
            ParentRef::Malformed => return Err(VaultError::ParentNotFound),
        };

        match self.metadata.get(id).await? {
            Some(node) if node.node_type == NodeType::Folder && node.user_id == owner => {
                Ok(node.id)
            }
            _ => Err(VaultError::ParentNotFound),
        }
    }

    async fn readable_node(&self, caller: Option<i64>, id: i64) -> Result<Node> {
        match self.metadata.get(id).await? {
            Some(node) if can_read(&node, caller) => Ok(node),
            _ => Err(not_found()),
        }
    }

    async fn owned_node(&self, owner: i64, id: i64) -> Result<Node> {
        match self.metadata.get(id).await? {
            Some(node) if can_modify(&node, owner) => Ok(node),
            _ => Err(not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{FileStorage, NodeRepository};
    use crate::Database;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const OWNER: i64 = 1;
    const OTHER: i64 = 2;

    struct Fixture {
        _db: Database,
        _dir: TempDir,
        storage: FileStorage,
        manager: FileManager,
    }

    async fn setup() -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let manager = FileManager::new(
            Arc::new(NodeRepository::new(db.pool().clone())),
            Arc::new(storage.clone()),
        );
        Fixture {
            _db: db,
            _dir: dir,
            storage,
            manager,
        }
    }

    fn folder(name: &str, parent: ParentRef) -> CreateNode {
        CreateNode {
            name: Some(name.to_string()),
            node_type: Some("folder".to_string()),
            parent,
            ..Default::default()
        }
    }

    fn file(name: &str, data: &str, parent: ParentRef) -> CreateNode {
        CreateNode {
            name: Some(name.to_string()),
            node_type: Some("file".to_string()),
            parent,
            data: Some(data.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_file() {
        let fx = setup().await;

        let created = fx
            .manager
            .create_node(OWNER, file("hello.txt", "aGVsbG8=", ParentRef::Root))
            .await
            .unwrap();

        assert_eq!(created.user_id, OWNER);
        assert_eq!(created.node_type, NodeType::File);
        assert_eq!(created.parent_id, ROOT_PARENT_ID);
        assert!(!created.is_public);
        assert_eq!(created.data.as_deref(), Some("aGVsbG8="));

        let fetched = fx.manager.get_node(Some(OWNER), created.id).await.unwrap();
        assert_eq!(fetched, created);

        let (node, bytes) = fx.manager.get_content(Some(OWNER), created.id).await.unwrap();
        assert_eq!(bytes, b"hello");
        assert!(fx.storage.exists(node.local_path.as_deref().unwrap()).await);
    }

    #[tokio::test]
    async fn test_create_folder_has_no_data() {
        let fx = setup().await;

        let created = fx
            .manager
            .create_node(OWNER, folder("docs", ParentRef::Root))
            .await
            .unwrap();
        assert!(created.data.is_none());

        let fetched = fx.manager.get_node(Some(OWNER), created.id).await.unwrap();
        assert!(fetched.data.is_none());

        let result = fx.manager.get_content(Some(OWNER), created.id).await;
        assert!(matches!(result, Err(VaultError::FolderHasNoContent)));
    }

    #[tokio::test]
    async fn test_validation_order() {
        let fx = setup().await;

        let result = fx.manager.create_node(OWNER, CreateNode::default()).await;
        assert!(matches!(result, Err(VaultError::MissingField("name"))));

        let mut req = CreateNode {
            name: Some(String::new()),
            ..Default::default()
        };
        let result = fx.manager.create_node(OWNER, req.clone()).await;
        assert!(matches!(result, Err(VaultError::MissingField("name"))));

        req.name = Some("x".to_string());
        req.parent = ParentRef::Malformed;
        let result = fx.manager.create_node(OWNER, req.clone()).await;
        assert!(matches!(result, Err(VaultError::MissingField("type"))));

        req.node_type = Some("image".to_string());
        let result = fx.manager.create_node(OWNER, req.clone()).await;
        assert!(matches!(result, Err(VaultError::MissingField("data"))));

        req.data = Some("aGk=".to_string());
        let result = fx.manager.create_node(OWNER, req).await;
        assert!(matches!(result, Err(VaultError::ParentNotFound)));
    }

    #[tokio::test]
    async fn test_unknown_type_is_missing_type() {
        let fx = setup().await;

        let mut req = folder("x", ParentRef::Root);
        req.node_type = Some("video".to_string());

        let result = fx.manager.create_node(OWNER, req).await;
        assert!(matches!(result, Err(VaultError::MissingField("type"))));
    }

    #[tokio::test]
    async fn test_malformed_base64_is_missing_data() {
        let fx = setup().await;

        let result = fx
            .manager
            .create_node(OWNER, file("bad.bin", "***not base64***", ParentRef::Root))
            .await;
        assert!(matches!(result, Err(VaultError::MissingField("data"))));
    }

    #[tokio::test]
    async fn test_unpadded_base64_accepted() {
        let fx = setup().await;

        let created = fx
            .manager
            .create_node(OWNER, file("hi.txt", "aGVsbG8", ParentRef::Root))
            .await
            .unwrap();
        let (_, bytes) = fx.manager.get_content(Some(OWNER), created.id).await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn test_parent_must_be_existing_folder() {
        let fx = setup().await;

        let f = fx
            .manager
            .create_node(OWNER, file("a.txt", "YQ==", ParentRef::Root))
            .await
            .unwrap();

        let under_file = fx
            .manager
            .create_node(OWNER, folder("sub", ParentRef::Id(f.id)))
            .await;
        assert!(matches!(under_file, Err(VaultError::ParentNotFound)));

        let under_missing = fx
            .manager
            .create_node(OWNER, folder("sub", ParentRef::Id(9999)))
            .await;
        assert!(matches!(under_missing, Err(VaultError::ParentNotFound)));

        let under_malformed = fx
            .manager
            .create_node(OWNER, folder("sub", ParentRef::Malformed))
            .await;
        assert!(matches!(under_malformed, Err(VaultError::ParentNotFound)));
    }

    #[tokio::test]
    async fn test_parent_must_belong_to_owner() {
        let fx = setup().await;

        let theirs = fx
            .manager
            .create_node(OWNER, folder("F", ParentRef::Root))
            .await
            .unwrap();

        let under_foreign = fx
            .manager
            .create_node(OTHER, folder("sub", ParentRef::Id(theirs.id)))
            .await;
        assert!(matches!(under_foreign, Err(VaultError::ParentNotFound)));

        let file_under_foreign = fx
            .manager
            .create_node(OTHER, file("x.txt", "aGVsbG8=", ParentRef::Id(theirs.id)))
            .await;
        assert!(matches!(file_under_foreign, Err(VaultError::ParentNotFound)));

        // Nothing was written for the rejected requests
        assert_eq!(fx.manager.count_nodes().await.unwrap(), 1);
        assert!(fx
            .manager
            .list_nodes(OWNER, ParentRef::Id(theirs.id), None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_private_node_hidden_from_others() {
        let fx = setup().await;

        let created = fx
            .manager
            .create_node(OWNER, file("secret.txt", "cw==", ParentRef::Root))
            .await
            .unwrap();

        for caller in [Some(OTHER), None] {
            let result = fx.manager.get_node(caller, created.id).await;
            assert!(matches!(result, Err(VaultError::NotFound(_))));
            let result = fx.manager.get_content(caller, created.id).await;
            assert!(matches!(result, Err(VaultError::NotFound(_))));
        }
    }

    #[tokio::test]
    async fn test_publish_grants_read_to_everyone() {
        let fx = setup().await;

        let created = fx
            .manager
            .create_node(OWNER, file("pub.txt", "cA==", ParentRef::Root))
            .await
            .unwrap();

        fx.manager.set_visibility(OWNER, created.id, true).await.unwrap();
        fx.manager.set_visibility(OWNER, created.id, true).await.unwrap();

        let seen = fx.manager.get_node(Some(OTHER), created.id).await.unwrap();
        assert!(seen.is_public);
        assert_eq!(seen.data.as_deref(), Some("cA=="));
        assert!(fx.manager.get_node(None, created.id).await.is_ok());

        fx.manager.set_visibility(OWNER, created.id, false).await.unwrap();
        fx.manager.set_visibility(OWNER, created.id, false).await.unwrap();

        let result = fx.manager.get_node(Some(OTHER), created.id).await;
        assert!(matches!(result, Err(VaultError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_only_owner_changes_visibility() {
        let fx = setup().await;

        let created = fx
            .manager
            .create_node(OWNER, folder("mine", ParentRef::Root))
            .await
            .unwrap();

        let result = fx.manager.set_visibility(OTHER, created.id, true).await;
        assert!(matches!(result, Err(VaultError::NotFound(_))));

        let result = fx.manager.set_visibility(OWNER, 4242, true).await;
        assert!(matches!(result, Err(VaultError::NotFound(_))));

        let node = fx.manager.get_node(Some(OWNER), created.id).await.unwrap();
        assert!(!node.is_public);
    }

    #[tokio::test]
    async fn test_list_pages() {
        let fx = setup().await;

        for i in 0..25 {
            fx.manager
                .create_node(OWNER, folder(&format!("f{i}"), ParentRef::Root))
                .await
                .unwrap();
        }

        let first = fx.manager.list_nodes(OWNER, ParentRef::Root, None).await.unwrap();
        let second = fx
            .manager
            .list_nodes(OWNER, ParentRef::Root, Some(1))
            .await
            .unwrap();
        let past = fx
            .manager
            .list_nodes(OWNER, ParentRef::Root, Some(2))
            .await
            .unwrap();

        assert_eq!(first.len(), PAGE_SIZE as usize);
        assert_eq!(second.len(), 5);
        assert!(past.is_empty());
        assert!(first.iter().all(|a| second.iter().all(|b| a.id != b.id)));
        assert!(first.windows(2).all(|w| w[0].id < w[1].id));
        assert!(first.iter().all(|n| n.data.is_none()));

        let negative = fx
            .manager
            .list_nodes(OWNER, ParentRef::Root, Some(-3))
            .await
            .unwrap();
        assert_eq!(negative, first);
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped() {
        let fx = setup().await;

        let theirs = fx
            .manager
            .create_node(OTHER, folder("shared", ParentRef::Root))
            .await
            .unwrap();
        fx.manager.set_visibility(OTHER, theirs.id, true).await.unwrap();
        fx.manager
            .create_node(OTHER, folder("inner", ParentRef::Id(theirs.id)))
            .await
            .unwrap();

        let root = fx.manager.list_nodes(OWNER, ParentRef::Root, None).await.unwrap();
        assert!(root.is_empty());

        let inside = fx
            .manager
            .list_nodes(OWNER, ParentRef::Id(theirs.id), None)
            .await
            .unwrap();
        assert!(inside.is_empty());
    }

    #[tokio::test]
    async fn test_list_under_file_or_malformed_is_empty() {
        let fx = setup().await;

        let f = fx
            .manager
            .create_node(OWNER, file("a.txt", "YQ==", ParentRef::Root))
            .await
            .unwrap();

        let under_file = fx
            .manager
            .list_nodes(OWNER, ParentRef::Id(f.id), None)
            .await
            .unwrap();
        assert!(under_file.is_empty());

        let malformed = fx
            .manager
            .list_nodes(OWNER, ParentRef::Malformed, None)
            .await
            .unwrap();
        assert!(malformed.is_empty());
    }

    #[tokio::test]
    async fn test_delete_file_removes_blob() {
        let fx = setup().await;

        let created = fx
            .manager
            .create_node(OWNER, file("gone.txt", "Zw==", ParentRef::Root))
            .await
            .unwrap();
        let (node, _) = fx.manager.get_content(Some(OWNER), created.id).await.unwrap();
        let handle = node.local_path.unwrap();

        let result = fx.manager.delete_node(OTHER, created.id).await;
        assert!(matches!(result, Err(VaultError::NotFound(_))));

        fx.manager.delete_node(OWNER, created.id).await.unwrap();

        assert!(!fx.storage.exists(&handle).await);
        let result = fx.manager.get_node(Some(OWNER), created.id).await;
        assert!(matches!(result, Err(VaultError::NotFound(_))));
        let result = fx.manager.delete_node(OWNER, created.id).await;
        assert!(matches!(result, Err(VaultError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_folder_keeps_children() {
        let fx = setup().await;

        let parent = fx
            .manager
            .create_node(OWNER, folder("F", ParentRef::Root))
            .await
            .unwrap();
        let child = fx
            .manager
            .create_node(OWNER, file("X", "aGVsbG8=", ParentRef::Id(parent.id)))
            .await
            .unwrap();

        fx.manager.delete_node(OWNER, parent.id).await.unwrap();

        let still_there = fx.manager.get_node(Some(OWNER), child.id).await.unwrap();
        assert_eq!(still_there.parent_id, parent.id);
        assert_eq!(fx.manager.count_nodes().await.unwrap(), 1);

        // A new folder never reuses the deleted id, so it cannot adopt X.
        let replacement = fx
            .manager
            .create_node(OWNER, folder("F2", ParentRef::Root))
            .await
            .unwrap();
        assert_ne!(replacement.id, parent.id);
    }

    #[tokio::test]
    async fn test_folder_file_scenario() {
        let fx = setup().await;

        let f = fx
            .manager
            .create_node(OWNER, folder("F", ParentRef::Root))
            .await
            .unwrap();
        let x = fx
            .manager
            .create_node(OWNER, file("X", "aGVsbG8=", ParentRef::Id(f.id)))
            .await
            .unwrap();

        let listed = fx
            .manager
            .list_nodes(OWNER, ParentRef::Id(f.id), None)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, x.id);

        assert!(fx.manager.get_node(Some(OTHER), x.id).await.is_err());
        fx.manager.set_visibility(OWNER, x.id, true).await.unwrap();

        let seen = fx.manager.get_node(Some(OTHER), x.id).await.unwrap();
        assert_eq!(seen.data.as_deref(), Some("aGVsbG8="));
    }

    struct FailingBlobs;

    #[async_trait]
    impl BlobStore for FailingBlobs {
        async fn put(&self, _content: &[u8]) -> Result<String> {
            Err(VaultError::Io(std::io::Error::other("disk full")))
        }
        async fn get(&self, _handle: &str) -> Result<Vec<u8>> {
            Err(VaultError::Io(std::io::Error::other("disk gone")))
        }
        async fn delete(&self, _handle: &str) -> Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_blob_failure_writes_no_metadata() {
        let db = Database::open_in_memory().await.unwrap();
        let metadata = Arc::new(NodeRepository::new(db.pool().clone()));
        let manager = FileManager::new(metadata.clone(), Arc::new(FailingBlobs));

        let result = manager
            .create_node(OWNER, file("a.txt", "YQ==", ParentRef::Root))
            .await;

        assert!(matches!(result, Err(VaultError::Io(_))));
        assert_eq!(metadata.count().await.unwrap(), 0);
    }

    /// Metadata store whose writes always fail.
    struct FailingMetadata {
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl MetadataStore for FailingMetadata {
        async fn insert(&self, _node: &NewNode) -> Result<Node> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Err(VaultError::Database("locked".to_string()))
        }
        async fn get(&self, _id: i64) -> Result<Option<Node>> {
            Ok(None)
        }
        async fn list_by_parent(&self, _: i64, _: i64, _: i64, _: i64) -> Result<Vec<Node>> {
            Ok(Vec::new())
        }
        async fn set_public(&self, _id: i64, _is_public: bool) -> Result<bool> {
            Ok(false)
        }
        async fn delete(&self, _id: i64) -> Result<bool> {
            Ok(false)
        }
        async fn count(&self) -> Result<i64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_metadata_failure_after_blob_write_is_reported() {
        let dir = TempDir::new().unwrap();
        let metadata = Arc::new(FailingMetadata {
            inserts: AtomicUsize::new(0),
        });
        let manager = FileManager::new(
            metadata.clone(),
            Arc::new(FileStorage::new(dir.path()).unwrap()),
        );

        let result = manager
            .create_node(OWNER, file("a.txt", "YQ==", ParentRef::Root))
            .await;

        assert!(matches!(result, Err(VaultError::Database(_))));
        assert_eq!(metadata.inserts.load(Ordering::SeqCst), 1);
    }
}
