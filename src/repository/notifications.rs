use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::{Notification, NotificationType};

const NOTIFICATION_SELECT: &str = "SELECT id, user_id, message, type, related_post_id,
        related_user_id, is_read, created_at
 FROM notifications";

const NEWEST_FIRST: &str = "ORDER BY created_at DESC, id DESC";

/// Row to be written for a single recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: i64,
    pub message: String,
    pub kind: NotificationType,
    pub related_post_id: Option<i64>,
    pub related_user_id: Option<i64>,
}

fn map_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        message: row.get(2)?,
        kind: row.get(3)?,
        related_post_id: row.get(4)?,
        related_user_id: row.get(5)?,
        is_read: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn query_notifications(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<Notification>> {
    let mut stmt = conn.prepare(sql)?;
    let notifications = stmt
        .query_map(params, map_notification)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(notifications)
}

pub fn insert(conn: &Connection, new: &NewNotification) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO notifications (user_id, message, type, related_post_id, related_user_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new.user_id,
            new.message,
            new.kind,
            new.related_post_id,
            new.related_user_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Notification>> {
    conn.query_row(
        &format!("{NOTIFICATION_SELECT} WHERE id = ?1"),
        params![id],
        map_notification,
    )
    .optional()
}

pub fn for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Notification>> {
    query_notifications(
        conn,
        &format!("{NOTIFICATION_SELECT} WHERE user_id = ?1 {NEWEST_FIRST}"),
        params![user_id],
    )
}

pub fn page_for_user(
    conn: &Connection,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> rusqlite::Result<Vec<Notification>> {
    query_notifications(
        conn,
        &format!("{NOTIFICATION_SELECT} WHERE user_id = ?1 {NEWEST_FIRST} LIMIT ?2 OFFSET ?3"),
        params![user_id, limit, offset],
    )
}

pub fn count_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

pub fn unread_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Notification>> {
    query_notifications(
        conn,
        &format!("{NOTIFICATION_SELECT} WHERE user_id = ?1 AND is_read = 0 {NEWEST_FIRST}"),
        params![user_id],
    )
}

pub fn count_unread(conn: &Connection, user_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
        params![user_id],
        |row| row.get(0),
    )
}

pub fn mark_read(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE id = ?1",
        params![id],
    )
}

pub fn mark_all_read(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
        params![user_id],
    )
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM notifications WHERE id = ?1", params![id])
}

pub fn delete_read(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM notifications WHERE user_id = ?1 AND is_read = 1",
        params![user_id],
    )
}
