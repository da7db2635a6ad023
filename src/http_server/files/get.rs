use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use http::{header, StatusCode};

use crate::auth::{authorize_volume, Credentials, GateError, Op};
use crate::files::FileError;
use crate::ServiceState;

/// GET /{volume}/{filename} — file content with the stored content
/// headers, 404 when the blob is absent.
pub async fn handler(
    State(state): State<ServiceState>,
    Path((volume, filename)): Path<(String, String)>,
    creds: Credentials,
) -> Result<Response, GetError> {
    authorize_volume(state.registry(), &volume, Op::Get, &creds).await?;

    let blob = state.files().get(&volume, &filename).await?;

    let mut builder = Response::builder().status(StatusCode::OK);
    if let Some(content_type) = &blob.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    Ok(builder.body(Body::from(blob.data)).unwrap())
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
