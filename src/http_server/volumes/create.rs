use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::registry::{RegistryError, VolumeSpec};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponse {
    pub volume: String,
}

/// POST /{volume} — open registration: no gate, the registry's atomic
/// put-if-absent enforces uniqueness.
pub async fn handler(
    State(state): State<ServiceState>,
    Path(volume): Path<String>,
    body: Result<Json<VolumeSpec>, JsonRejection>,
) -> Result<impl IntoResponse, CreateError> {
    let Json(spec) = body.map_err(|e| CreateError::MalformedBody(e.to_string()))?;
    state.registry().create(&volume, spec).await?;
    Ok((
        http::StatusCode::CREATED,
        Json(CreateResponse { volume }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("Malformed request: {0}")]
    MalformedBody(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        match self {
            CreateError::MalformedBody(msg) => {
                (http::StatusCode::BAD_REQUEST, format!("Malformed request: {msg}"))
                    .into_response()
            }
            CreateError::Registry(e) => e.into_response(),
        }
    }
}
