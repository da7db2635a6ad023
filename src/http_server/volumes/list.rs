use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{authorize_admin, Credentials, GateError};
use crate::registry::RegistryError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub volumes: Vec<String>,
}

/// GET /volumes — administrative enumeration of every volume id,
/// guarded by the privilege gate (process-wide secret, `Secret` scheme
/// only). No ordering guarantee.
pub async fn handler(
    State(state): State<ServiceState>,
    creds: Credentials,
) -> Result<impl IntoResponse, ListError> {
    authorize_admin(state.admin_secret(), &creds)?;
    let volumes = state.registry().list().await?;
    Ok(Json(ListResponse { volumes }).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        match self {
            ListError::Gate(e) => e.into_response(),
            ListError::Registry(e) => e.into_response(),
        }
    }
}
