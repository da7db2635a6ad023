use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::auth::{authorize_volume, Credentials, GateError, Op};
use crate::files::{FileError, FileStore};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutResponse {
    pub key: String,
}

/// PUT /{volume}/{filename} — the raw request body is the payload,
/// overwriting any existing blob under the same key.
pub async fn handler(
    State(state): State<ServiceState>,
    Path((volume, filename)): Path<(String, String)>,
    creds: Credentials,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, PutError> {
    authorize_volume(state.registry(), &volume, Op::Put, &creds).await?;

    let content_type = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    state
        .files()
        .put(&volume, &filename, body, content_type)
        .await?;

    let key = FileStore::key_for(&volume, &filename);
    tracing::debug!(key = %key, "stored file");
    Ok(Json(PutResponse { key }).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum PutError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    File(#[from] FileError),
}

impl IntoResponse for PutError {
    fn into_response(self) -> Response {
        match self {
            PutError::Gate(e) => e.into_response(),
            PutError::File(e) => e.into_response(),
        }
    }
}
