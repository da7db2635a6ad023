use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth::{authorize_volume, Credentials, GateError, Op};
use crate::files::FileError;
use crate::ServiceState;

#[derive(Debug, Deserialize)]
pub struct GetQuery {
    /// Any value (including empty) switches the response from metadata
    /// to a file listing.
    #[serde(default)]
    pub list: Option<String>,
}

/// GET /{volume} — volume metadata, or the file listing when the `list`
/// flag is set. Listing is a read over the volume's files, so it
/// authorizes as a `get`; the metadata response includes the secret and
/// authorizes as a management operation.
pub async fn handler(
    State(state): State<ServiceState>,
    Path(volume): Path<String>,
    Query(query): Query<GetQuery>,
    creds: Credentials,
) -> Result<Response, GetError> {
    if query.list.is_some() {
        authorize_volume(state.registry(), &volume, Op::Get, &creds).await?;
        let filenames = state.files().list(&volume).await?;
        return Ok(Json(filenames).into_response());
    }

    let meta = authorize_volume(state.registry(), &volume, Op::Manage, &creds).await?;
    Ok(Json(meta).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    File(#[from] FileError),
}

impl IntoResponse for GetError {
    fn into_response(self) -> Response {
        match self {
            GetError::Gate(e) => e.into_response(),
            GetError::File(e) => e.into_response(),
        }
    }
}
