use std::sync::Arc;

use crate::config::Config;
use crate::files::FileStore;
use crate::registry::Registry;
use crate::storage::{FsBlobStore, MetaStore, SqliteMetaStore, StorageError};

/// Shared per-process state handed to every handler. Cheap to clone;
/// the registry and file store are the only shared mutation points.
#[derive(Clone)]
pub struct ServiceState {
    registry: Registry,
    files: FileStore,
    admin_secret: Arc<str>,
    version: Arc<str>,
}

impl ServiceState {
    pub fn new(registry: Registry, files: FileStore, admin_secret: &str, version: &str) -> Self {
        Self {
            registry,
            files,
            admin_secret: admin_secret.into(),
            version: version.into(),
        }
    }

    /// Wire up the durable stores: SQLite metadata (file-backed or
    /// in-memory) and directory-backed blobs.
    pub async fn from_config(config: &Config) -> Result<Self, StateError> {
        let meta: Arc<dyn MetaStore> = match &config.sqlite_path {
            Some(path) => Arc::new(SqliteMetaStore::connect(path).await?),
            None => {
                tracing::warn!("no database path configured, volume registry is in-memory");
                Arc::new(SqliteMetaStore::connect_memory().await?)
            }
        };
        let blobs = Arc::new(FsBlobStore::open(config.blobs_dir.clone()).await?);

        Ok(Self::new(
            Registry::new(meta),
            FileStore::new(blobs),
            &config.admin_secret,
            &config.version,
        ))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    pub fn admin_secret(&self) -> &str {
        &self.admin_secret
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to set up storage: {0}")]
    Storage(#[from] StorageError),
}
