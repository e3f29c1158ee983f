use rusqlite::Connection;
use serde::Serialize;

use crate::db::models::{Comment, Notification, NotificationType, User};
use crate::error::{AppError, AppResult};
use crate::repository::notifications::{self as repo, NewNotification};
use crate::repository::{follows, users};
use crate::services::Window;

/// Content events that notify other users.
#[derive(Debug, Clone, Copy)]
pub enum NotificationEvent<'a> {
    NewPost {
        author: &'a User,
        post_id: i64,
        title: &'a str,
    },
    NewFollower {
        follower: &'a User,
        followed_id: i64,
    },
    PostLike {
        liker: &'a User,
        post_id: i64,
        post_author_id: i64,
        title: &'a str,
    },
    Comment {
        commenter: &'a User,
        post_id: i64,
        post_author_id: i64,
        title: &'a str,
    },
    CommentLike {
        liker: &'a User,
        comment: &'a Comment,
    },
}

impl NotificationEvent<'_> {
    fn kind(&self) -> NotificationType {
        match self {
            NotificationEvent::NewPost { .. } => NotificationType::NewPost,
            NotificationEvent::NewFollower { .. } => NotificationType::NewFollower,
            NotificationEvent::PostLike { .. } => NotificationType::PostLike,
            NotificationEvent::Comment { .. } => NotificationType::Comment,
            NotificationEvent::CommentLike { .. } => NotificationType::CommentLike,
        }
    }

    fn actor(&self) -> &User {
        match self {
            NotificationEvent::NewPost { author, .. } => author,
            NotificationEvent::NewFollower { follower, .. } => follower,
            NotificationEvent::PostLike { liker, .. } => liker,
            NotificationEvent::Comment { commenter, .. } => commenter,
            NotificationEvent::CommentLike { liker, .. } => liker,
        }
    }

    fn related_post_id(&self) -> Option<i64> {
        match self {
            NotificationEvent::NewPost { post_id, .. }
            | NotificationEvent::PostLike { post_id, .. }
            | NotificationEvent::Comment { post_id, .. } => Some(*post_id),
            NotificationEvent::CommentLike { comment, .. } => Some(comment.post_id),
            NotificationEvent::NewFollower { .. } => None,
        }
    }

    fn message(&self) -> String {
        match self {
            NotificationEvent::NewPost { author, title, .. } => {
                format!("{} published a new post: {}", author.username, title)
            }
            NotificationEvent::NewFollower { follower, .. } => {
                format!("{} started following you", follower.username)
            }
            NotificationEvent::PostLike { liker, title, .. } => {
                format!("{} liked your post: {}", liker.username, title)
            }
            NotificationEvent::Comment {
                commenter, title, ..
            } => {
                format!("{} commented on your post: {}", commenter.username, title)
            }
            NotificationEvent::CommentLike { liker, .. } => {
                format!("{} liked your comment", liker.username)
            }
        }
    }

    fn recipients(&self, conn: &Connection) -> rusqlite::Result<Vec<User>> {
        let single = |id: i64| -> rusqlite::Result<Vec<User>> {
            Ok(users::find_by_id(conn, id)?.into_iter().collect())
        };
        match self {
            NotificationEvent::NewPost { author, .. } => follows::followers(conn, author.id),
            NotificationEvent::NewFollower { followed_id, .. } => single(*followed_id),
            NotificationEvent::PostLike { post_author_id, .. }
            | NotificationEvent::Comment { post_author_id, .. } => single(*post_author_id),
            NotificationEvent::CommentLike { comment, .. } => single(comment.author.id),
        }
    }
}

/// Write one notification per recipient of `event`. Banned recipients and
/// the actor are skipped. Runs on the caller's connection, so a failure rolls
/// back the triggering write along with it. Returns the number of rows written.
pub fn fan_out(conn: &Connection, event: NotificationEvent<'_>) -> AppResult<usize> {
    let actor_id = event.actor().id;
    let message = event.message();
    let mut written = 0;

    for recipient in event.recipients(conn)? {
        if recipient.id == actor_id || recipient.is_banned {
            continue;
        }
        repo::insert(
            conn,
            &NewNotification {
                user_id: recipient.id,
                message: message.clone(),
                kind: event.kind(),
                related_post_id: event.related_post_id(),
                related_user_id: Some(actor_id),
            },
        )?;
        written += 1;
    }

    tracing::debug!(kind = %event.kind().as_str(), recipients = written, "Notifications written");
    Ok(written)
}

// --- Inbox ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

pub fn list(conn: &Connection, user_id: i64) -> AppResult<Vec<Notification>> {
    Ok(repo::for_user(conn, user_id)?)
}

/// Zero-based page of a user's notifications, newest first.
pub fn page(conn: &Connection, user_id: i64, page: i64, size: i64) -> AppResult<NotificationPage> {
    let window = Window::new(page, size, 0);
    let total = repo::count_for_user(conn, user_id)?;
    let notifications = repo::page_for_user(conn, user_id, window.limit, window.offset)?;
    Ok(NotificationPage {
        notifications,
        total,
        total_pages: window.total_pages(total),
        current_page: window.page,
    })
}

pub fn unread(conn: &Connection, user_id: i64) -> AppResult<Vec<Notification>> {
    Ok(repo::unread_for_user(conn, user_id)?)
}

pub fn count_unread(conn: &Connection, user_id: i64) -> AppResult<i64> {
    Ok(repo::count_unread(conn, user_id)?)
}

/// Load a notification and make sure it belongs to `user_id`.
fn owned(conn: &Connection, id: i64, user_id: i64) -> AppResult<Notification> {
    let notification = repo::find(conn, id)?.ok_or_else(|| AppError::not_found("Notification"))?;
    if notification.user_id != user_id {
        return Err(AppError::Forbidden(
            "You can only modify your own notifications".into(),
        ));
    }
    Ok(notification)
}

pub fn mark_read(conn: &mut Connection, id: i64, user_id: i64) -> AppResult<()> {
    let tx = conn.transaction()?;
    owned(&tx, id, user_id)?;
    repo::mark_read(&tx, id)?;
    tx.commit()?;
    Ok(())
}

pub fn mark_all_read(conn: &Connection, user_id: i64) -> AppResult<usize> {
    Ok(repo::mark_all_read(conn, user_id)?)
}

pub fn delete(conn: &mut Connection, id: i64, user_id: i64) -> AppResult<()> {
    let tx = conn.transaction()?;
    owned(&tx, id, user_id)?;
    repo::delete(&tx, id)?;
    tx.commit()?;
    Ok(())
}

pub fn delete_read(conn: &Connection, user_id: i64) -> AppResult<usize> {
    Ok(repo::delete_read(conn, user_id)?)
}
