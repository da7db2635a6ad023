use std::sync::Arc;

use bytes::Bytes;

use crate::storage::{Blob, BlobStore, StorageError};

/// Separator between the volume and filename components of a blob key.
pub const KEY_SEPARATOR: char = '/';

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("invalid filename: {0}")]
    InvalidName(String),
    #[error("file not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StorageError),
}

impl axum::response::IntoResponse for FileError {
    fn into_response(self) -> axum::response::Response {
        use http::StatusCode;
        match self {
            FileError::InvalidName(msg) => {
                (StatusCode::BAD_REQUEST, format!("Malformed request: {msg}.")).into_response()
            }
            FileError::NotFound => (StatusCode::NOT_FOUND, "File not found.").into_response(),
            FileError::Store(_) => {
                tracing::error!("blob store failure: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "unknown server error").into_response()
            }
        }
    }
}

/// Derives globally-unique blob keys from (volume, filename) and scopes
/// every blob operation to one volume's namespace.
#[derive(Clone)]
pub struct FileStore {
    store: Arc<dyn BlobStore>,
}

impl FileStore {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// `volume ++ "/" ++ filename`. Callers must have validated both
    /// components; the filename is an opaque single path segment.
    pub fn key_for(volume: &str, filename: &str) -> String {
        format!("{volume}{KEY_SEPARATOR}{filename}")
    }

    /// Filenames containing the key separator would alias another
    /// volume's namespace, so they are rejected at the boundary, along
    /// with traversal segments.
    pub fn validate_filename(filename: &str) -> Result<(), FileError> {
        if filename.is_empty() {
            return Err(FileError::InvalidName("filename must be non-empty".into()));
        }
        if filename.contains(KEY_SEPARATOR) || filename.contains('\\') {
            return Err(FileError::InvalidName(
                "filename must not contain a path separator".into(),
            ));
        }
        if filename == "." || filename == ".." {
            return Err(FileError::InvalidName(
                "filename must not be a relative path segment".into(),
            ));
        }
        Ok(())
    }

    pub async fn get(&self, volume: &str, filename: &str) -> Result<Blob, FileError> {
        Self::validate_filename(filename)?;
        self.store
            .get(&Self::key_for(volume, filename))
            .await?
            .ok_or(FileError::NotFound)
    }

    /// Overwrite semantics: an existing blob under the same key is
    /// replaced.
    pub async fn put(
        &self,
        volume: &str,
        filename: &str,
        content: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), FileError> {
        Self::validate_filename(filename)?;
        self.store
            .put(&Self::key_for(volume, filename), content, content_type)
            .await?;
        Ok(())
    }

    /// Strict delete: heads first and surfaces `NotFound` for an absent
    /// key, so delete-confirmation endpoints can 404.
    pub async fn delete(&self, volume: &str, filename: &str) -> Result<(), FileError> {
        Self::validate_filename(filename)?;
        let key = Self::key_for(volume, filename);
        if !self.store.head(&key).await? {
            return Err(FileError::NotFound);
        }
        self.store.delete(&key).await?;
        Ok(())
    }

    /// All filenames under the volume's prefix, prefix stripped.
    pub async fn list(&self, volume: &str) -> Result<Vec<String>, FileError> {
        let prefix = format!("{volume}{KEY_SEPARATOR}");
        let keys = self.store.list_prefix(&prefix).await?;
        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }
}
