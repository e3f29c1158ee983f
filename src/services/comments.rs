use rusqlite::Connection;
use serde::Deserialize;
use validator::Validate;

use crate::db::models::{Comment, User};
use crate::error::{AppError, AppResult};
use crate::repository::comments as repo;
use crate::services::notifications::{fan_out, NotificationEvent};
use crate::services::posts;

pub const MAX_COMMENT: usize = 2000;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentInput {
    #[serde(default)]
    #[validate(
        custom(function = "crate::validation::not_blank", message = "Comment is required"),
        length(max = 2000, message = "Comment must be at most 2000 characters")
    )]
    pub content: String,
}

pub fn add(
    conn: &mut Connection,
    post_id: i64,
    author: &User,
    input: CommentInput,
) -> AppResult<Comment> {
    input.validate()?;

    let tx = conn.transaction()?;
    let post = posts::get(&tx, post_id, Some(author))?;
    let id = repo::insert(&tx, post.id, author.id, input.content.trim())?;
    fan_out(
        &tx,
        NotificationEvent::Comment {
            commenter: author,
            post_id: post.id,
            post_author_id: post.author.id,
            title: &post.title,
        },
    )?;
    let comment = repo::find(&tx, id)?.ok_or_else(|| AppError::not_found("Comment"))?;
    tx.commit()?;

    Ok(comment)
}

/// A comment under a post `user` is allowed to see.
fn visible_comment(conn: &Connection, post_id: i64, comment_id: i64, user: &User) -> AppResult<Comment> {
    posts::get(conn, post_id, Some(user))?;
    posts::require_comment(conn, post_id, comment_id)
}

/// Like a comment. Returns the comment's like count afterwards.
pub fn like(conn: &mut Connection, post_id: i64, comment_id: i64, user: &User) -> AppResult<i64> {
    let tx = conn.transaction()?;
    let comment = visible_comment(&tx, post_id, comment_id, user)?;
    if repo::insert_like(&tx, user.id, comment_id)? > 0 {
        repo::adjust_like_count(&tx, comment_id, 1)?;
        fan_out(
            &tx,
            NotificationEvent::CommentLike {
                liker: user,
                comment: &comment,
            },
        )?;
    }
    let count = posts::require_comment(&tx, post_id, comment_id)?.like_count;
    tx.commit()?;
    Ok(count)
}

pub fn unlike(
    conn: &mut Connection,
    post_id: i64,
    comment_id: i64,
    user: &User,
) -> AppResult<i64> {
    let tx = conn.transaction()?;
    visible_comment(&tx, post_id, comment_id, user)?;
    if repo::delete_like(&tx, user.id, comment_id)? > 0 {
        repo::adjust_like_count(&tx, comment_id, -1)?;
    }
    let count = posts::require_comment(&tx, post_id, comment_id)?.like_count;
    tx.commit()?;
    Ok(count)
}

pub fn has_liked(conn: &Connection, post_id: i64, comment_id: i64, user: &User) -> AppResult<bool> {
    visible_comment(conn, post_id, comment_id, user)?;
    Ok(repo::like_exists(conn, user.id, comment_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::posts::PostInput;
    use crate::services::testing;

    fn setup() -> (Connection, User, User, i64) {
        let mut conn = testing::conn();
        let author = testing::user(&conn, "author");
        let reader = testing::user(&conn, "reader");
        let post = posts::create(
            &mut conn,
            &author,
            PostInput {
                title: "Topic".into(),
                content: "Body".into(),
                ..Default::default()
            },
        )
        .unwrap();
        (conn, author, reader, post.id)
    }

    fn text(content: &str) -> CommentInput {
        CommentInput {
            content: content.into(),
        }
    }

    #[test]
    fn comment_notifies_post_author() {
        let (mut conn, author, reader, post_id) = setup();
        let comment = add(&mut conn, post_id, &reader, text(" Nice post ")).unwrap();

        assert_eq!(comment.content, "Nice post");
        assert_eq!(comment.author.username, "reader");
        assert_eq!(comment.post_id, post_id);

        let inbox = crate::repository::notifications::for_user(&conn, author.id).unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message, "reader commented on your post: Topic");
    }

    #[test]
    fn commenting_on_own_post_does_not_notify() {
        let (mut conn, author, _, post_id) = setup();
        add(&mut conn, post_id, &author, text("Self reply")).unwrap();
        assert_eq!(
            testing::count(&conn, "SELECT COUNT(*) FROM notifications"),
            0
        );
    }

    #[test]
    fn comments_listed_oldest_first() {
        let (mut conn, _, reader, post_id) = setup();
        add(&mut conn, post_id, &reader, text("first")).unwrap();
        add(&mut conn, post_id, &reader, text("second")).unwrap();

        let listed = posts::comments(&conn, post_id, None).unwrap();
        let contents: Vec<_> = listed.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(posts::get(&conn, post_id, None).unwrap().comment_count, 2);
    }

    #[test]
    fn blank_or_long_comment_rejected() {
        let (mut conn, _, reader, post_id) = setup();
        assert!(matches!(
            add(&mut conn, post_id, &reader, text("   ")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            add(&mut conn, post_id, &reader, text(&"x".repeat(MAX_COMMENT + 1))),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            add(&mut conn, 999, &reader, text("orphan")),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn comment_like_counts_once_and_notifies() {
        let (mut conn, _, reader, post_id) = setup();
        let commenter = testing::user(&conn, "commenter");
        let comment = add(&mut conn, post_id, &commenter, text("Like me")).unwrap();

        assert_eq!(like(&mut conn, post_id, comment.id, &reader).unwrap(), 1);
        assert_eq!(like(&mut conn, post_id, comment.id, &reader).unwrap(), 1);
        assert!(has_liked(&conn, post_id, comment.id, &reader).unwrap());

        let inbox = crate::repository::notifications::for_user(&conn, commenter.id).unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message, "reader liked your comment");
        assert_eq!(inbox[0].related_post_id, Some(post_id));

        assert_eq!(unlike(&mut conn, post_id, comment.id, &reader).unwrap(), 0);
        assert_eq!(unlike(&mut conn, post_id, comment.id, &reader).unwrap(), 0);
    }

    #[test]
    fn comment_must_belong_to_post() {
        let (mut conn, author, reader, post_id) = setup();
        let comment = add(&mut conn, post_id, &reader, text("Here")).unwrap();
        let other = posts::create(
            &mut conn,
            &author,
            PostInput {
                title: "Other".into(),
                content: "Body".into(),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(matches!(
            like(&mut conn, other.id, comment.id, &reader),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn comments_on_hidden_post_cannot_be_liked() {
        let (mut conn, author, reader, post_id) = setup();
        let comment = add(&mut conn, post_id, &author, text("Before hiding")).unwrap();
        posts::set_hidden(&conn, post_id, true).unwrap();

        assert!(matches!(
            like(&mut conn, post_id, comment.id, &reader),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            has_liked(&conn, post_id, comment.id, &reader),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(testing::count(&conn, "SELECT COUNT(*) FROM comment_likes"), 0);
        assert_eq!(like(&mut conn, post_id, comment.id, &author).unwrap(), 1);
    }
}
