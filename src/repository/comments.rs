use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::{AuthorSummary, Comment};

const COMMENT_SELECT: &str = "SELECT c.id, c.post_id, c.content, c.like_count, c.created_at, c.updated_at,
        u.id, u.username, u.full_name, u.avatar, u.profile_picture_url
 FROM comments c
 JOIN users u ON u.id = c.author_id";

fn map_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        content: row.get(2)?,
        like_count: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        author: AuthorSummary {
            id: row.get(6)?,
            username: row.get(7)?,
            full_name: row.get(8)?,
            avatar: row.get(9)?,
            profile_picture_url: row.get(10)?,
        },
    })
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Comment>> {
    conn.query_row(
        &format!("{COMMENT_SELECT} WHERE c.id = ?1"),
        params![id],
        map_comment,
    )
    .optional()
}

/// Comments on a post, oldest first.
pub fn for_post(conn: &Connection, post_id: i64) -> rusqlite::Result<Vec<Comment>> {
    let mut stmt = conn.prepare(&format!(
        "{COMMENT_SELECT} WHERE c.post_id = ?1 ORDER BY c.created_at ASC, c.id ASC"
    ))?;
    let comments = stmt
        .query_map(params![post_id], map_comment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

pub fn insert(
    conn: &Connection,
    post_id: i64,
    author_id: i64,
    content: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO comments (content, author_id, post_id) VALUES (?1, ?2, ?3)",
        params![content, author_id, post_id],
    )?;
    Ok(conn.last_insert_rowid())
}

// --- Likes ---

pub fn like_exists(conn: &Connection, user_id: i64, comment_id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM comment_likes WHERE user_id = ?1 AND comment_id = ?2",
        params![user_id, comment_id],
        |row| row.get(0),
    )
}

pub fn insert_like(conn: &Connection, user_id: i64, comment_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT OR IGNORE INTO comment_likes (user_id, comment_id) VALUES (?1, ?2)",
        params![user_id, comment_id],
    )
}

pub fn delete_like(conn: &Connection, user_id: i64, comment_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM comment_likes WHERE user_id = ?1 AND comment_id = ?2",
        params![user_id, comment_id],
    )
}

pub fn adjust_like_count(
    conn: &Connection,
    comment_id: i64,
    delta: i64,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE comments SET like_count = MAX(like_count + ?2, 0) WHERE id = ?1",
        params![comment_id, delta],
    )
}

/// Drop one like from every comment `user_id` has liked.
pub fn release_likes_of(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE comments SET like_count = MAX(like_count - 1, 0)
         WHERE id IN (SELECT comment_id FROM comment_likes WHERE user_id = ?1)",
        params![user_id],
    )
}
