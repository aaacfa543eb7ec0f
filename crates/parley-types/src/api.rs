use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_chat::Message;

// -- JWT Claims --

/// JWT claims shared between parley-api (REST middleware) and
/// parley-gateway (WebSocket Identify). Canonical definition lives here
/// to avoid duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Response envelope --

/// Uniform REST envelope: every endpoint answers
/// `{ "success": ..., "message": ..., "data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub email: String,
}

// -- Users --

#[derive(Debug, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUsernameRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub sender_id: i64,
    pub receiver_id: i64,
    /// Absent content is allowed; the classifier treats it as clean.
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: Option<String>,
    pub delivered: bool,
    pub read: bool,
    pub toxic: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            receiver_id: m.receiver_id,
            content: m.content,
            delivered: m.delivered,
            read: m.read,
            toxic: m.toxic,
            created_at: m.created_at,
        }
    }
}

// -- Files --

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadData {
    pub filename: String,
    pub size: u64,
}
