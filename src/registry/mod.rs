use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::{MetaStore, StorageError};

/// Route names a volume id may not shadow.
const RESERVED_IDS: &[&str] = &["ping", "version", "volumes"];

/// A file operation that can appear in a volume's exemption list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FileOp {
    Get,
    Put,
    Delete,
}

/// Legacy protection enum. Kept as an alternative request shape only;
/// converted to the canonical exemption set at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectedMode {
    Get,
    Put,
    Both,
    None,
}

impl ProtectedMode {
    /// Inverts "which operations are protected" into "which operations
    /// are exempt". Management operations stay credentialed either way.
    fn exemptions(self) -> BTreeSet<FileOp> {
        let protected: &[FileOp] = match self {
            ProtectedMode::Get => &[FileOp::Get],
            ProtectedMode::Put => &[FileOp::Put],
            ProtectedMode::Both => &[FileOp::Get, FileOp::Put],
            ProtectedMode::None => &[],
        };
        [FileOp::Get, FileOp::Put, FileOp::Delete]
            .into_iter()
            .filter(|op| !protected.contains(op))
            .collect()
    }
}

/// Stored volume metadata, canonical shape. `no_auth = None` means no
/// exemptions: every operation requires a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMeta {
    pub secret: String,
    #[serde(default)]
    pub no_auth: Option<BTreeSet<FileOp>>,
}

impl VolumeMeta {
    pub fn exempts(&self, op: FileOp) -> bool {
        self.no_auth.as_ref().is_some_and(|set| set.contains(&op))
    }
}

/// Volume registration request body. Exactly one policy shape may be
/// supplied: the canonical `no_auth` list or the legacy `protected`
/// enum. Field names disambiguate; both at once is an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_auth: Option<Vec<FileOp>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<ProtectedMode>,
}

impl VolumeSpec {
    pub fn locked(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            no_auth: None,
            protected: None,
        }
    }

    pub fn with_exemptions(
        secret: impl Into<String>,
        ops: impl IntoIterator<Item = FileOp>,
    ) -> Self {
        Self {
            secret: secret.into(),
            no_auth: Some(ops.into_iter().collect()),
            protected: None,
        }
    }

    fn into_meta(self) -> Result<VolumeMeta, RegistryError> {
        if self.secret.is_empty() {
            return Err(RegistryError::Validation("`secret` must be non-empty".into()));
        }
        let no_auth = match (self.no_auth, self.protected) {
            (Some(_), Some(_)) => {
                return Err(RegistryError::Validation(
                    "supply either `no_auth` or `protected`, not both".into(),
                ));
            }
            (Some(list), None) => Some(dedup_exemptions(list)?),
            (None, Some(mode)) => Some(mode.exemptions()),
            (None, None) => None,
        };
        Ok(VolumeMeta {
            secret: self.secret,
            no_auth,
        })
    }
}

/// Partial update request body. Absent fields are preserved; `no_auth`
/// set to JSON `null` explicitly clears the exemption list.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumePatch {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub no_auth: Option<Option<Vec<FileOp>>>,
    #[serde(default)]
    pub protected: Option<ProtectedMode>,
}

impl VolumePatch {
    fn apply(self, meta: &mut VolumeMeta) -> Result<(), RegistryError> {
        if self.no_auth.is_some() && self.protected.is_some() {
            return Err(RegistryError::Validation(
                "supply either `no_auth` or `protected`, not both".into(),
            ));
        }
        if let Some(secret) = self.secret {
            if secret.is_empty() {
                return Err(RegistryError::Validation("`secret` must be non-empty".into()));
            }
            meta.secret = secret;
        }
        if let Some(no_auth) = self.no_auth {
            meta.no_auth = match no_auth {
                Some(list) => Some(dedup_exemptions(list)?),
                None => None,
            };
        }
        if let Some(mode) = self.protected {
            meta.no_auth = Some(mode.exemptions());
        }
        Ok(())
    }
}

fn dedup_exemptions(list: Vec<FileOp>) -> Result<BTreeSet<FileOp>, RegistryError> {
    let set: BTreeSet<FileOp> = list.iter().copied().collect();
    if set.len() != list.len() {
        return Err(RegistryError::Validation(
            "duplicate entries in `no_auth`".into(),
        ));
    }
    Ok(set)
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("volume not found")]
    NotFound,
    #[error("volume already exists")]
    Conflict,
    #[error("invalid volume metadata: {0}")]
    Validation(String),
    #[error("stored volume metadata is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StorageError),
}

impl axum::response::IntoResponse for RegistryError {
    fn into_response(self) -> axum::response::Response {
        use http::StatusCode;
        match self {
            RegistryError::NotFound => {
                (StatusCode::NOT_FOUND, "Volume not found.").into_response()
            }
            RegistryError::Conflict => (StatusCode::CONFLICT, "Volume exists.").into_response(),
            RegistryError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Malformed request: {msg}."),
            )
                .into_response(),
            RegistryError::Corrupt(_) | RegistryError::Store(_) => {
                tracing::error!("registry failure: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "unknown server error").into_response()
            }
        }
    }
}

/// Durable mapping from volume id to metadata, backed by a key/value
/// store. Creation leans on the store's atomic put-if-absent; updates
/// are read-modify-write with last-write-wins semantics.
#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn MetaStore>,
}

impl Registry {
    pub fn new(store: Arc<dyn MetaStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, id: &str, spec: VolumeSpec) -> Result<(), RegistryError> {
        validate_id(id)?;
        let meta = spec.into_meta()?;
        let encoded = serde_json::to_string(&meta)?;
        if !self.store.put_if_absent(id, &encoded).await? {
            return Err(RegistryError::Conflict);
        }
        tracing::info!(volume = id, "registered volume");
        Ok(())
    }

    pub async fn read(&self, id: &str) -> Result<VolumeMeta, RegistryError> {
        let raw = self.store.get(id).await?.ok_or(RegistryError::NotFound)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub async fn update(&self, id: &str, patch: VolumePatch) -> Result<VolumeMeta, RegistryError> {
        let mut meta = self.read(id).await?;
        patch.apply(&mut meta)?;
        self.store.put(id, &serde_json::to_string(&meta)?).await?;
        tracing::info!(volume = id, "updated volume metadata");
        Ok(meta)
    }

    /// Idempotent: deleting an unregistered id succeeds. Files under the
    /// volume's prefix are orphaned, not removed.
    pub async fn delete(&self, id: &str) -> Result<(), RegistryError> {
        self.store.delete(id).await?;
        tracing::info!(volume = id, "deleted volume");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<String>, RegistryError> {
        Ok(self.store.list_keys().await?)
    }
}

fn validate_id(id: &str) -> Result<(), RegistryError> {
    if id.is_empty() {
        return Err(RegistryError::Validation("volume id must be non-empty".into()));
    }
    if id.contains('/') {
        return Err(RegistryError::Validation("volume id must not contain `/`".into()));
    }
    if RESERVED_IDS.contains(&id) {
        return Err(RegistryError::Validation(format!(
            "volume id `{id}` is reserved"
        )));
    }
    Ok(())
}
