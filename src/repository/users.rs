use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::{Role, User};

/// Column list for `users u`, in the order `map_user` reads them.
pub const USER_COLUMNS: &str = "u.id, u.username, u.email, u.password_hash, u.role, u.is_banned, \
     u.banned_at, u.full_name, u.bio, u.avatar, u.profile_picture_url, u.created_at, u.updated_at";

pub fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        is_banned: row.get(5)?,
        banned_at: row.get(6)?,
        full_name: row.get(7)?,
        bio: row.get(8)?,
        avatar: row.get(9)?,
        profile_picture_url: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1"),
        params![id],
        map_user,
    )
    .optional()
}

pub fn find_by_username(conn: &Connection, username: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1"),
        params![username],
        map_user,
    )
    .optional()
}

pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.email = ?1"),
        params![email],
        map_user,
    )
    .optional()
}

pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users u ORDER BY u.id"))?;
    let users = stmt
        .query_map([], map_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

pub fn insert(
    conn: &Connection,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (username, email, password_hash, role) VALUES (?1, ?2, ?3, ?4)",
        params![username, email, password_hash, role],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_profile(conn: &Connection, user: &User) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE users
         SET full_name = ?2, bio = ?3, avatar = ?4, profile_picture_url = ?5,
             updated_at = datetime('now')
         WHERE id = ?1",
        params![
            user.id,
            user.full_name,
            user.bio,
            user.avatar,
            user.profile_picture_url
        ],
    )
}

pub fn set_password_hash(conn: &Connection, id: i64, hash: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE users SET password_hash = ?2, updated_at = datetime('now') WHERE id = ?1",
        params![id, hash],
    )
}

pub fn set_banned(conn: &Connection, id: i64, banned: bool) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE users
         SET is_banned = ?2,
             banned_at = CASE WHEN ?2 THEN datetime('now') ELSE NULL END,
             updated_at = datetime('now')
         WHERE id = ?1",
        params![id, banned],
    )
}

pub fn set_role(conn: &Connection, id: i64, role: Role) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE users SET role = ?2, updated_at = datetime('now') WHERE id = ?1",
        params![id, role],
    )
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM users WHERE id = ?1", params![id])
}
