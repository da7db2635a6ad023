mod fs;
mod memory;
mod sqlite;

pub use fs::FsBlobStore;
pub use memory::{MemoryBlobStore, MemoryMetaStore};
pub use sqlite::SqliteMetaStore;

use async_trait::async_trait;
use bytes::Bytes;

/// Key/value store backing the volume registry. Values are opaque JSON
/// documents; the registry owns their shape.
#[async_trait]
pub trait MetaStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Unconditional write, replacing any existing value.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Atomic put-if-absent. Returns `false` (leaving the existing value
    /// untouched) when the key is already present.
    async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool, StorageError>;

    /// Removes the key if present. Removing an absent key is a no-op.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    async fn list_keys(&self) -> Result<Vec<String>, StorageError>;
}

/// A stored blob plus whatever content metadata the store tracks.
#[derive(Debug, Clone)]
pub struct Blob {
    pub data: Bytes,
    pub content_type: Option<String>,
}

/// Opaque blob store with prefix listing. Keys are `/`-joined paths
/// produced by the file namespacer.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<Blob>, StorageError>;

    /// Overwrite semantics: an existing blob at `key` is replaced.
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Existence check without fetching the payload.
    async fn head(&self, key: &str) -> Result<bool, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// All keys under `prefix`, store-defined order, prefix included.
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("metadata store error: {0}")]
    Meta(#[from] sqlx::Error),
    #[error("blob store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}
