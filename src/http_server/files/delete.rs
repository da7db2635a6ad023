use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{authorize_volume, Credentials, GateError, Op};
use crate::files::{FileError, FileStore};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub key: String,
}

/// DELETE /{volume}/{filename} — strict delete: 404 when the file is
/// already absent.
pub async fn handler(
    State(state): State<ServiceState>,
    Path((volume, filename)): Path<(String, String)>,
    creds: Credentials,
) -> Result<impl IntoResponse, DeleteError> {
    authorize_volume(state.registry(), &volume, Op::Delete, &creds).await?;
    state.files().delete(&volume, &filename).await?;

    let key = FileStore::key_for(&volume, &filename);
    Ok(Json(DeleteResponse { key }).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    File(#[from] FileError),
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        match self {
            DeleteError::Gate(e) => e.into_response(),
            DeleteError::File(e) => e.into_response(),
        }
    }
}
