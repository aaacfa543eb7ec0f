use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use parley_types::api::ApiResponse;

/// Build an envelope response with an explicit status code.
pub fn envelope<T: Serialize>(status: StatusCode, body: ApiResponse<T>) -> Response {
    (status, Json(body)).into_response()
}

/// Failure envelope with no data payload.
pub fn failure(status: StatusCode, message: &str) -> Response {
    envelope(status, ApiResponse::<()>::failure(message))
}
