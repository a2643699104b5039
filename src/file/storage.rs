//! Blob storage for node content.
//!
//! Content is written under UUID handles in a sharded directory tree:
//! ```text
//! {base_path}/
//! ├── ab/
//! │   └── ab12cd34-5678-90ab-cdef-123456789012
//! └── cd/
//!     └── cd90ab12-3456-7890-abcd-ef1234567890
//! ```

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::{Result, VaultError};

/// Persistence for raw node content.
///
/// Knows nothing about owners or the tree; a handle is all it needs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes and return the new handle.
    async fn put(&self, content: &[u8]) -> Result<String>;

    /// Read the bytes behind a handle.
    async fn get(&self, handle: &str) -> Result<Vec<u8>>;

    /// Remove a blob. Returns `false` if it did not exist.
    async fn delete(&self, handle: &str) -> Result<bool>;
}

/// Filesystem-backed blob store.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the full path for a handle: `{base_path}/{shard}/{handle}`.
    pub fn blob_path(&self, handle: &str) -> Result<PathBuf> {
        if !Self::is_valid_handle(handle) {
            return Err(VaultError::Validation(format!("invalid blob handle: {handle}")));
        }
        Ok(self.base_path.join(Self::shard(handle)).join(handle))
    }

    /// Check if a blob exists.
    pub async fn exists(&self, handle: &str) -> bool {
        match self.blob_path(handle) {
            Ok(path) => fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// First two characters of the handle.
    fn shard(handle: &str) -> &str {
        handle.get(..2).unwrap_or(handle)
    }

    /// Handles are generated UUIDs; anything else could escape the base path.
    fn is_valid_handle(handle: &str) -> bool {
        Uuid::parse_str(handle).is_ok()
    }
}

#[async_trait]
impl BlobStore for FileStorage {
    async fn put(&self, content: &[u8]) -> Result<String> {
        let handle = Uuid::new_v4().to_string();
        let path = self.blob_path(&handle)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;

        Ok(handle)
    }

    async fn get(&self, handle: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(handle)?;

        match fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(VaultError::NotFound(format!("blob {handle}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, handle: &str) -> Result<bool> {
        let path = self.blob_path(handle)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
