use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{authorize_volume, Credentials, GateError, Op};
use crate::registry::RegistryError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub volume: String,
}

/// DELETE /{volume} — removes the registry entry. Files under the
/// volume's prefix are orphaned, not deleted. The gate resolves the
/// volume first, so deleting an unregistered volume 404s here even
/// though the registry-level delete is idempotent.
pub async fn handler(
    State(state): State<ServiceState>,
    Path(volume): Path<String>,
    creds: Credentials,
) -> Result<impl IntoResponse, DeleteError> {
    authorize_volume(state.registry(), &volume, Op::Manage, &creds).await?;
    state.registry().delete(&volume).await?;
    Ok(Json(DeleteResponse { volume }).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        match self {
            DeleteError::Gate(e) => e.into_response(),
            DeleteError::Registry(e) => e.into_response(),
        }
    }
}
