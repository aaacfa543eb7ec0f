use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::error;

use parley_chat::ChatError;
use parley_types::api::{ApiResponse, Claims, MessageDto, SendMessageRequest};

use crate::auth::AppState;
use crate::response::{envelope, failure};

/// Accept a message. The pipeline stamps delivery/toxicity flags and
/// persists; this handler only translates between JSON and the pipeline.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Response, StatusCode> {
    // Run blocking pipeline work off the async runtime
    let app = state.clone();
    let message = tokio::task::spawn_blocking(move || {
        app.pipeline
            .send_message(req.sender_id, req.receiver_id, req.content)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(envelope(
        StatusCode::OK,
        ApiResponse::ok("Message sent successfully", MessageDto::from(message)),
    ))
}

/// All messages addressed to a receiver. An empty inbox is a success with
/// an empty list, not an error.
pub async fn get_messages_by_receiver(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(_claims): Extension<Claims>,
) -> Result<Response, StatusCode> {
    let app = state.clone();
    let messages = tokio::task::spawn_blocking(move || app.pipeline.messages_for_receiver(id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let dtos: Vec<MessageDto> = messages.into_iter().map(MessageDto::from).collect();

    Ok(envelope(
        StatusCode::OK,
        ApiResponse::ok("Messages retrieved successfully", dtos),
    ))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(_claims): Extension<Claims>,
) -> Result<Response, StatusCode> {
    let app = state.clone();
    let result = tokio::task::spawn_blocking(move || app.pipeline.mark_read(id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    match result {
        Ok(message) => Ok(envelope(
            StatusCode::OK,
            ApiResponse::ok("Message marked as read", MessageDto::from(message)),
        )),
        Err(ChatError::NotFound) => Ok(failure(StatusCode::NOT_FOUND, "Message not found")),
        Err(ChatError::Store(e)) => {
            error!("store error on mark_read({}): {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
