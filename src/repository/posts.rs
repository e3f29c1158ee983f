use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::{AuthorSummary, Post};
use crate::repository::comments;

const POST_SELECT: &str = "SELECT p.id, p.title, p.content, p.media_type, p.media_url, p.like_count,
        p.is_hidden, p.created_at, p.updated_at,
        u.id, u.username, u.full_name, u.avatar, u.profile_picture_url,
        (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count
 FROM posts p
 JOIN users u ON u.id = p.author_id";

const NEWEST_FIRST: &str = "ORDER BY p.created_at DESC, p.id DESC";

/// Write shape for creating or replacing a post's editable fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub media_type: Option<String>,
    pub media_url: Option<String>,
    pub tags: Vec<String>,
}

fn map_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        media_type: row.get(3)?,
        media_url: row.get(4)?,
        like_count: row.get(5)?,
        is_hidden: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        author: AuthorSummary {
            id: row.get(9)?,
            username: row.get(10)?,
            full_name: row.get(11)?,
            avatar: row.get(12)?,
            profile_picture_url: row.get(13)?,
        },
        comment_count: row.get(14)?,
        tags: Vec::new(),
        comments: Vec::new(),
    })
}

/// Attach tags and comments to freshly mapped posts.
fn hydrate(conn: &Connection, mut posts: Vec<Post>) -> rusqlite::Result<Vec<Post>> {
    for post in posts.iter_mut() {
        post.tags = tags(conn, post.id)?;
        post.comments = comments::for_post(conn, post.id)?;
    }
    Ok(posts)
}

fn query_posts(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<Post>> {
    let mut stmt = conn.prepare(sql)?;
    let posts = stmt
        .query_map(params, map_post)?
        .collect::<Result<Vec<_>, _>>()?;
    hydrate(conn, posts)
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Post>> {
    let post = conn
        .query_row(&format!("{POST_SELECT} WHERE p.id = ?1"), params![id], map_post)
        .optional()?;

    match post {
        Some(post) => Ok(hydrate(conn, vec![post])?.pop()),
        None => Ok(None),
    }
}

pub fn author_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT author_id FROM posts WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )
    .optional()
}

pub fn page_visible(conn: &Connection, limit: i64, offset: i64) -> rusqlite::Result<Vec<Post>> {
    query_posts(
        conn,
        &format!("{POST_SELECT} WHERE p.is_hidden = 0 {NEWEST_FIRST} LIMIT ?1 OFFSET ?2"),
        params![limit, offset],
    )
}

pub fn count_visible(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM posts WHERE is_hidden = 0", [], |row| {
        row.get(0)
    })
}

pub fn page_all(conn: &Connection, limit: i64, offset: i64) -> rusqlite::Result<Vec<Post>> {
    query_posts(
        conn,
        &format!("{POST_SELECT} {NEWEST_FIRST} LIMIT ?1 OFFSET ?2"),
        params![limit, offset],
    )
}

pub fn count_all(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
}

/// Visible posts written by anyone `follower_id` follows.
pub fn visible_from_followed(conn: &Connection, follower_id: i64) -> rusqlite::Result<Vec<Post>> {
    query_posts(
        conn,
        &format!(
            "{POST_SELECT}
             WHERE p.is_hidden = 0
               AND p.author_id IN (SELECT following_id FROM subscriptions WHERE follower_id = ?1)
             {NEWEST_FIRST}"
        ),
        params![follower_id],
    )
}

pub fn visible_by_author(conn: &Connection, author_id: i64) -> rusqlite::Result<Vec<Post>> {
    query_posts(
        conn,
        &format!("{POST_SELECT} WHERE p.is_hidden = 0 AND p.author_id = ?1 {NEWEST_FIRST}"),
        params![author_id],
    )
}

pub fn count_by_author(conn: &Connection, author_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM posts WHERE author_id = ?1",
        params![author_id],
        |row| row.get(0),
    )
}

/// Media references on every post by `author_id`.
pub fn media_urls_by_author(conn: &Connection, author_id: i64) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT media_url FROM posts WHERE author_id = ?1 AND media_url IS NOT NULL",
    )?;
    let urls = stmt
        .query_map(params![author_id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(urls)
}

pub fn insert(conn: &Connection, author_id: i64, draft: &PostDraft) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO posts (title, content, media_type, media_url, author_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            draft.title,
            draft.content,
            draft.media_type,
            draft.media_url,
            author_id
        ],
    )?;
    let id = conn.last_insert_rowid();
    replace_tags(conn, id, &draft.tags)?;
    Ok(id)
}

pub fn update(conn: &Connection, id: i64, draft: &PostDraft) -> rusqlite::Result<usize> {
    let changed = conn.execute(
        "UPDATE posts
         SET title = ?2, content = ?3, media_type = ?4, media_url = ?5,
             updated_at = datetime('now')
         WHERE id = ?1",
        params![
            id,
            draft.title,
            draft.content,
            draft.media_type,
            draft.media_url
        ],
    )?;
    if changed > 0 {
        replace_tags(conn, id, &draft.tags)?;
    }
    Ok(changed)
}

pub fn tags(conn: &Connection, post_id: i64) -> rusqlite::Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT tag FROM post_tags WHERE post_id = ?1 ORDER BY position")?;
    let tags = stmt
        .query_map(params![post_id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

fn replace_tags(conn: &Connection, post_id: i64, tags: &[String]) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM post_tags WHERE post_id = ?1", params![post_id])?;
    let mut stmt =
        conn.prepare("INSERT INTO post_tags (post_id, position, tag) VALUES (?1, ?2, ?3)")?;
    for (position, tag) in tags.iter().enumerate() {
        stmt.execute(params![post_id, position as i64, tag])?;
    }
    Ok(())
}

pub fn set_hidden(conn: &Connection, id: i64, hidden: bool) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE posts SET is_hidden = ?2, updated_at = datetime('now') WHERE id = ?1",
        params![id, hidden],
    )
}

/// Remove a post. Tags, comments, likes, reports and notifications that
/// point at it go with it through `ON DELETE CASCADE`.
pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM posts WHERE id = ?1", params![id])
}

// --- Likes ---

pub fn like_exists(conn: &Connection, user_id: i64, post_id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM post_likes WHERE user_id = ?1 AND post_id = ?2",
        params![user_id, post_id],
        |row| row.get(0),
    )
}

pub fn insert_like(conn: &Connection, user_id: i64, post_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT OR IGNORE INTO post_likes (user_id, post_id) VALUES (?1, ?2)",
        params![user_id, post_id],
    )
}

pub fn delete_like(conn: &Connection, user_id: i64, post_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM post_likes WHERE user_id = ?1 AND post_id = ?2",
        params![user_id, post_id],
    )
}

/// Shift the counter by `delta`, never below zero.
pub fn adjust_like_count(conn: &Connection, post_id: i64, delta: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE posts SET like_count = MAX(like_count + ?2, 0) WHERE id = ?1",
        params![post_id, delta],
    )
}

/// Drop one like from every post `user_id` has liked.
pub fn release_likes_of(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE posts SET like_count = MAX(like_count - 1, 0)
         WHERE id IN (SELECT post_id FROM post_likes WHERE user_id = ?1)",
        params![user_id],
    )
}
