use rusqlite::{params, Connection, OptionalExtension};

pub fn insert(conn: &Connection, url: &str, owner_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO uploads (url, owner_id) VALUES (?1, ?2)",
        params![url, owner_id],
    )?;
    Ok(())
}

pub fn owner(conn: &Connection, url: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT owner_id FROM uploads WHERE url = ?1",
        params![url],
        |row| row.get(0),
    )
    .optional()
}

/// Whether any post or profile still points at `url`.
pub fn is_referenced(conn: &Connection, url: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM posts WHERE media_url = ?1)
             OR EXISTS (SELECT 1 FROM users WHERE profile_picture_url = ?1)",
        params![url],
        |row| row.get(0),
    )
}

pub fn delete(conn: &Connection, url: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM uploads WHERE url = ?1", params![url])
}
