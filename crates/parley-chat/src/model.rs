use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted message. `id` is assigned by the store on insert and is
/// stable thereafter; `content`, `toxic` and `created_at` never change
/// after the initial write; `read` only ever goes false -> true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: Option<String>,
    pub delivered: bool,
    pub read: bool,
    pub toxic: bool,
    pub created_at: DateTime<Utc>,
}

/// A message that has been stamped by the pipeline but not yet inserted.
/// The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: Option<String>,
    pub delivered: bool,
    pub read: bool,
    pub toxic: bool,
    pub created_at: DateTime<Utc>,
}
