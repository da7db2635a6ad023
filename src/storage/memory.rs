use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::{Blob, BlobStore, MetaStore, StorageError};

/// In-memory metadata store. Used by unit and integration tests; the
/// single lock makes `put_if_absent` trivially atomic.
#[derive(Debug, Default)]
pub struct MemoryMetaStore {
    entries: RwLock<BTreeMap<String, String>>,
}

#[async_trait]
impl MetaStore for MemoryMetaStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool, StorageError> {
        let mut entries = self.entries.write();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

/// In-memory blob store mirroring the `BlobStore` contract, content type
/// included.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<BTreeMap<String, Blob>>,
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Blob>, StorageError> {
        Ok(self.blobs.read().get(key).cloned())
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.blobs.write().insert(
            key.to_string(),
            Blob {
                data,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn head(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.blobs.read().contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.blobs.write().remove(key);
        Ok(())
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .blobs
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
