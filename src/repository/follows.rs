use rusqlite::{params, Connection, Row};

use crate::db::models::{FollowEntry, FollowStats, User};
use crate::repository::users::{map_user, USER_COLUMNS};

pub fn exists(conn: &Connection, follower_id: i64, following_id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM subscriptions WHERE follower_id = ?1 AND following_id = ?2",
        params![follower_id, following_id],
        |row| row.get(0),
    )
}

pub fn insert(conn: &Connection, follower_id: i64, following_id: i64) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO subscriptions (follower_id, following_id) VALUES (?1, ?2)",
        params![follower_id, following_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete(conn: &Connection, follower_id: i64, following_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM subscriptions WHERE follower_id = ?1 AND following_id = ?2",
        params![follower_id, following_id],
    )
}

/// Full user rows of everyone following `user_id`. Used for fan-out.
pub fn followers(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS}
         FROM subscriptions s
         JOIN users u ON u.id = s.follower_id
         WHERE s.following_id = ?1
         ORDER BY s.id"
    ))?;
    let users = stmt
        .query_map(params![user_id], map_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<FollowEntry> {
    Ok(FollowEntry {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        followed_at: row.get(3)?,
    })
}

/// Users that `user_id` follows, most recent first.
pub fn following_entries(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<FollowEntry>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.username, u.email, s.created_at
         FROM subscriptions s
         JOIN users u ON u.id = s.following_id
         WHERE s.follower_id = ?1
         ORDER BY s.created_at DESC, s.id DESC",
    )?;
    let entries = stmt
        .query_map(params![user_id], map_entry)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// Users following `user_id`, most recent first.
pub fn follower_entries(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<FollowEntry>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.username, u.email, s.created_at
         FROM subscriptions s
         JOIN users u ON u.id = s.follower_id
         WHERE s.following_id = ?1
         ORDER BY s.created_at DESC, s.id DESC",
    )?;
    let entries = stmt
        .query_map(params![user_id], map_entry)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

pub fn stats(conn: &Connection, user_id: i64) -> rusqlite::Result<FollowStats> {
    conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM subscriptions WHERE following_id = ?1),
            (SELECT COUNT(*) FROM subscriptions WHERE follower_id = ?1)",
        params![user_id],
        |row| {
            Ok(FollowStats {
                followers_count: row.get(0)?,
                following_count: row.get(1)?,
            })
        },
    )
}
