use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use super::{Blob, BlobStore, StorageError};

/// Directory-backed blob store. Keys are `/`-joined relative paths, so a
/// volume's files land in their own subdirectory. Content types are
/// recovered from the file extension rather than persisted.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty()
            || Path::new(key).is_absolute()
            || key.split('/').any(|seg| seg.is_empty() || seg == "..")
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Blob>, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => {
                let content_type = mime_guess::from_path(&path)
                    .first()
                    .map(|m| m.to_string());
                Ok(Some(Blob {
                    data: Bytes::from(data),
                    content_type,
                }))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &data).await?;
        Ok(())
    }

    async fn head(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let dir = prefix.trim_end_matches('/');
        let path = self.resolve(dir)?;
        let mut entries = match tokio::fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                keys.push(format!("{}/{}", dir, entry.file_name().to_string_lossy()));
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();

        store
            .put("alice/notes.txt", Bytes::from_static(b"hi"), None)
            .await
            .unwrap();
        let blob = store.get("alice/notes.txt").await.unwrap().unwrap();
        assert_eq!(blob.data.as_ref(), b"hi");
        assert_eq!(blob.content_type.as_deref(), Some("text/plain"));

        assert!(store.head("alice/notes.txt").await.unwrap());
        store.delete("alice/notes.txt").await.unwrap();
        assert!(!store.head("alice/notes.txt").await.unwrap());
        assert!(store.get("alice/notes.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_prefix_scopes_to_one_volume() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();

        store.put("alice/a.txt", Bytes::from_static(b"a"), None).await.unwrap();
        store.put("alice/b.txt", Bytes::from_static(b"b"), None).await.unwrap();
        store.put("bob/c.txt", Bytes::from_static(b"c"), None).await.unwrap();

        let mut keys = store.list_prefix("alice/").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["alice/a.txt", "alice/b.txt"]);
        assert!(store.list_prefix("carol/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).await.unwrap();

        let err = store.get("alice/../bob").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
