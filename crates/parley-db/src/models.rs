/// Database row types — these map directly to SQLite rows.
/// Message rows convert straight into the parley-chat domain type in
/// queries.rs; users have no domain crate and stay as rows.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub status: String,
    pub created_at: String,
}
