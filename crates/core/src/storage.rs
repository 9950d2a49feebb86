//! Image blob storage.
//!
//! Pictures reference their bytes by a relative key. The [`BlobStore`]
//! trait hides where those bytes live; [`LocalBlobStore`] keeps them on
//! the local filesystem under a root directory.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

/// Key prefix for uploaded pictures.
pub const PICTURES_PREFIX: &str = "pictures";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Opaque storage for uploaded image bytes, addressed by relative key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()>;

    /// Fetch the object stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;
}

/// Build the storage key for a picture from its content hash.
///
/// Keys are sharded by the first two hash characters:
/// `pictures/ab/abcdef....png`.
pub fn picture_key(content_hash: &str, extension: &str) -> String {
    let shard = content_hash.get(..2).unwrap_or(content_hash);
    let ext = extension.trim_start_matches('.').to_lowercase();
    if ext.is_empty() {
        format!("{PICTURES_PREFIX}/{shard}/{content_hash}")
    } else {
        format!("{PICTURES_PREFIX}/{shard}/{content_hash}.{ext}")
    }
}

/// Filesystem-backed blob store rooted at a directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path inside the root. Rejects absolute keys and
    /// any key that would escape the root.
    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let is_safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_safe {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.key_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, data).await?;
        tracing::debug!(key, bytes = data.len(), "Stored blob");
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_path(key)?;
        fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::Io(e)
            }
        })
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }
}
