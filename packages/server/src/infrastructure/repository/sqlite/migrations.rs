use rusqlite::Connection;

pub fn run(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS messages (
            seq                  INTEGER PRIMARY KEY AUTOINCREMENT,
            id                   TEXT NOT NULL UNIQUE,
            room_id              TEXT NOT NULL,
            sender_id            TEXT NOT NULL,
            sender_display_name  TEXT NOT NULL,
            sender_avatar_url    TEXT,
            sender_accent_color  TEXT,
            body                 TEXT NOT NULL,
            created_at           INTEGER NOT NULL,
            edited               INTEGER NOT NULL DEFAULT 0,
            edited_at            INTEGER,
            seen_by              TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX IF NOT EXISTS idx_messages_room
            ON messages(room_id, created_at, seq);
        ",
    )?;

    tracing::info!("Database migrations complete");
    Ok(())
}
