use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, Row};

use parley_chat::{Message, MessageStore, NewMessage, StoreError};

use crate::Database;
use crate::models::UserRow;

impl Database {
    // -- Users --

    /// Insert a user and return the store-assigned id.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        status: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password, status) VALUES (?1, ?2, ?3, ?4)",
                (username, email, password_hash, status),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email = ?1", email))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    /// Returns false if the user does not exist.
    pub fn update_username(&self, id: i64, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET username = ?1 WHERE id = ?2",
                rusqlite::params![username, id],
            )?;
            Ok(n > 0)
        })
    }

    /// Returns false if the user does not exist.
    pub fn update_status(&self, id: i64, status: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET status = ?1 WHERE id = ?2",
                rusqlite::params![status, id],
            )?;
            Ok(n > 0)
        })
    }
}

// -- Messages --

/// The pipeline's persistence seam, backed by the messages table.
impl MessageStore for Database {
    fn insert(&self, message: NewMessage) -> Result<Message, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (sender_id, receiver_id, content, delivered, read, toxic, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    message.sender_id,
                    message.receiver_id,
                    message.content,
                    message.delivered,
                    message.read,
                    message.toxic,
                    message.created_at.to_rfc3339(),
                ],
            )?;
            Ok(Message {
                id: conn.last_insert_rowid(),
                sender_id: message.sender_id,
                receiver_id: message.receiver_id,
                content: message.content,
                delivered: message.delivered,
                read: message.read,
                toxic: message.toxic,
                created_at: message.created_at,
            })
        })
        .map_err(StoreError::from)
    }

    fn update(&self, message: &Message) -> Result<Message, StoreError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE messages SET sender_id = ?1, receiver_id = ?2, content = ?3,
                        delivered = ?4, read = ?5, toxic = ?6, created_at = ?7
                 WHERE id = ?8",
                rusqlite::params![
                    message.sender_id,
                    message.receiver_id,
                    message.content,
                    message.delivered,
                    message.read,
                    message.toxic,
                    message.created_at.to_rfc3339(),
                    message.id,
                ],
            )?;
            if n == 0 {
                return Err(anyhow!("no message row with id {}", message.id));
            }
            Ok(message.clone())
        })
        .map_err(StoreError::from)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Message>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", SELECT_MESSAGE))?;
            let row = stmt.query_row([id], row_to_message).optional()?;
            Ok(row)
        })
        .map_err(StoreError::from)
    }

    fn find_by_receiver(&self, receiver_id: i64) -> Result<Vec<Message>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("{} WHERE receiver_id = ?1 ORDER BY id", SELECT_MESSAGE))?;
            let rows = stmt
                .query_map([receiver_id], row_to_message)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .map_err(StoreError::from)
    }
}

const SELECT_MESSAGE: &str =
    "SELECT id, sender_id, receiver_id, content, delivered, read, toxic, created_at FROM messages";

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        content: row.get(3)?,
        delivered: row.get(4)?,
        read: row.get(5)?,
        toxic: row.get(6)?,
        created_at: parse_timestamp(&row.get::<_, String>(7)?),
    })
}

/// Timestamps written by this crate are RFC 3339; rows created by other
/// tooling may carry SQLite's bare "YYYY-MM-DD HH:MM:SS" format.
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_default()
}

fn query_user<P: rusqlite::ToSql>(
    conn: &Connection,
    predicate: &str,
    param: P,
) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, email, password, status, created_at FROM users WHERE {}",
        predicate
    ))?;

    let row = stmt
        .query_row([&param], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                status: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
