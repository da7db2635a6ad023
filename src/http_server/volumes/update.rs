use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};

use crate::auth::{authorize_volume, Credentials, GateError, Op};
use crate::registry::{RegistryError, VolumePatch};
use crate::ServiceState;

/// PATCH /{volume} — partial metadata update. Only supplied fields are
/// merged; `no_auth: null` explicitly clears the exemption list.
pub async fn handler(
    State(state): State<ServiceState>,
    Path(volume): Path<String>,
    creds: Credentials,
    body: Result<Json<VolumePatch>, JsonRejection>,
) -> Result<impl IntoResponse, UpdateError> {
    authorize_volume(state.registry(), &volume, Op::Manage, &creds).await?;
    let Json(patch) = body.map_err(|e| UpdateError::MalformedBody(e.to_string()))?;
    let meta = state.registry().update(&volume, patch).await?;
    Ok(Json(meta).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("Malformed request: {0}")]
    MalformedBody(String),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        match self {
            UpdateError::MalformedBody(msg) => {
                (http::StatusCode::BAD_REQUEST, format!("Malformed request: {msg}"))
                    .into_response()
            }
            UpdateError::Gate(e) => e.into_response(),
            UpdateError::Registry(e) => e.into_response(),
        }
    }
}
