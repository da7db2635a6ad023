use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::ServiceState;

pub async fn handler(State(state): State<ServiceState>) -> impl IntoResponse {
    Json(state.version().to_string())
}
