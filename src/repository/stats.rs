use rusqlite::Connection;
use serde::Serialize;

/// Site-wide counters for the moderation dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_comments: i64,
    pub total_likes: i64,
    pub active_users: i64,
    pub banned_users: i64,
    pub admin_users: i64,
    pub posts_today: i64,
    pub comments_today: i64,
    pub new_users_this_week: i64,
    pub unresolved_reports: i64,
}

/// Every counter in one statement. Likes are counted from the like rows
/// rather than summed from the cached counters.
pub fn snapshot(conn: &Connection) -> rusqlite::Result<AdminStats> {
    conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM users),
            (SELECT COUNT(*) FROM posts),
            (SELECT COUNT(*) FROM comments),
            (SELECT COUNT(*) FROM post_likes) + (SELECT COUNT(*) FROM comment_likes),
            (SELECT COUNT(*) FROM users WHERE is_banned = 0),
            (SELECT COUNT(*) FROM users WHERE is_banned = 1),
            (SELECT COUNT(*) FROM users WHERE role = 'ADMIN'),
            (SELECT COUNT(*) FROM posts WHERE created_at >= date('now')),
            (SELECT COUNT(*) FROM comments WHERE created_at >= date('now')),
            (SELECT COUNT(*) FROM users WHERE created_at >= datetime('now', '-7 days')),
            (SELECT COUNT(*) FROM reports WHERE resolved = 0)",
        [],
        |row| {
            Ok(AdminStats {
                total_users: row.get(0)?,
                total_posts: row.get(1)?,
                total_comments: row.get(2)?,
                total_likes: row.get(3)?,
                active_users: row.get(4)?,
                banned_users: row.get(5)?,
                admin_users: row.get(6)?,
                posts_today: row.get(7)?,
                comments_today: row.get(8)?,
                new_users_this_week: row.get(9)?,
                unresolved_reports: row.get(10)?,
            })
        },
    )
}
