use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'OFFLINE',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- sender_id/receiver_id are plain integer references; no foreign
        -- keys are declared, referential integrity is not enforced here.
        CREATE TABLE IF NOT EXISTS messages (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            sender_id   INTEGER NOT NULL,
            receiver_id INTEGER NOT NULL,
            content     TEXT,
            delivered   INTEGER NOT NULL DEFAULT 0,
            read        INTEGER NOT NULL DEFAULT 0,
            toxic       INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_receiver
            ON messages(receiver_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
