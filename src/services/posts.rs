use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::{Comment, Post, User};
use crate::error::{AppError, AppResult};
use crate::repository::posts::{self as repo, PostDraft};
use crate::repository::{comments as comment_repo, users as user_repo};
use crate::services::media;
use crate::services::notifications::{fan_out, NotificationEvent};
use crate::services::Window;

pub const MAX_TITLE: usize = 150;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    #[serde(default)]
    #[validate(
        custom(function = "crate::validation::not_blank", message = "Title is required"),
        length(max = 150, message = "Title must be at most 150 characters")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(
        custom(function = "crate::validation::not_blank", message = "Content is required"),
        length(max = 10000, message = "Content must be at most 10000 characters")
    )]
    pub content: String,
    #[validate(custom(
        function = "crate::validation::tag_lengths",
        message = "Each tag must be at most 50 characters"
    ))]
    pub tags: Option<Vec<String>>,
    #[validate(custom(
        function = "crate::validation::media_type",
        message = "Media type must be one of: image, video, gif, file"
    ))]
    pub media_type: Option<String>,
    pub media_url: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl PostInput {
    /// Normalized write shape. `current_tags` is kept when no tags were sent.
    fn into_draft(self, current_tags: Vec<String>) -> PostDraft {
        let tags = match self.tags {
            Some(tags) => tags
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            None => current_tags,
        };
        PostDraft {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            media_type: non_blank(&self.media_type),
            media_url: non_blank(&self.media_url),
            tags,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

fn load(conn: &Connection, id: i64) -> AppResult<Post> {
    repo::find(conn, id)?.ok_or_else(|| AppError::not_found("Post"))
}

fn can_manage(post: &Post, user: &User) -> bool {
    post.author.id == user.id || user.is_admin()
}

/// One-based page of visible posts, newest first.
pub fn page_visible(conn: &Connection, page: i64, size: i64) -> AppResult<PostPage> {
    let window = Window::new(page, size, 1);
    let total = repo::count_visible(conn)?;
    Ok(PostPage {
        posts: repo::page_visible(conn, window.limit, window.offset)?,
        total,
        total_pages: window.total_pages(total),
        current_page: window.page,
    })
}

/// Same as `page_visible` but hidden posts are included.
pub fn page_all(conn: &Connection, page: i64, size: i64) -> AppResult<PostPage> {
    let window = Window::new(page, size, 1);
    let total = repo::count_all(conn)?;
    Ok(PostPage {
        posts: repo::page_all(conn, window.limit, window.offset)?,
        total,
        total_pages: window.total_pages(total),
        current_page: window.page,
    })
}

pub fn following_feed(conn: &Connection, user_id: i64) -> AppResult<Vec<Post>> {
    Ok(repo::visible_from_followed(conn, user_id)?)
}

pub fn by_author(conn: &Connection, author_id: i64) -> AppResult<Vec<Post>> {
    if user_repo::find_by_id(conn, author_id)?.is_none() {
        return Err(AppError::not_found("User"));
    }
    Ok(repo::visible_by_author(conn, author_id)?)
}

/// A post as seen by `viewer`. Hidden posts only exist for their author and admins.
pub fn get(conn: &Connection, id: i64, viewer: Option<&User>) -> AppResult<Post> {
    let post = load(conn, id)?;
    if post.is_hidden && !viewer.is_some_and(|v| can_manage(&post, v)) {
        return Err(AppError::not_found("Post"));
    }
    Ok(post)
}

pub fn comments(conn: &Connection, id: i64, viewer: Option<&User>) -> AppResult<Vec<Comment>> {
    Ok(get(conn, id, viewer)?.comments)
}

pub fn create(conn: &mut Connection, author: &User, input: PostInput) -> AppResult<Post> {
    input.validate()?;
    let draft = input.into_draft(Vec::new());

    let tx = conn.transaction()?;
    let id = repo::insert(&tx, author.id, &draft)?;
    fan_out(
        &tx,
        NotificationEvent::NewPost {
            author,
            post_id: id,
            title: &draft.title,
        },
    )?;
    let post = load(&tx, id)?;
    tx.commit()?;

    tracing::info!(post_id = id, author = %author.username, "Post created");
    Ok(post)
}

pub fn update(conn: &mut Connection, id: i64, actor: &User, input: PostInput) -> AppResult<Post> {
    input.validate()?;

    let tx = conn.transaction()?;
    let existing = load(&tx, id)?;
    if !can_manage(&existing, actor) {
        return Err(AppError::Forbidden("You can only edit your own posts".into()));
    }
    repo::update(&tx, id, &input.into_draft(existing.tags))?;
    let post = load(&tx, id)?;
    tx.commit()?;

    Ok(post)
}

/// Delete a post and everything hanging off it. Returns the media URL whose
/// file is no longer used by anyone, for the caller to remove from disk.
pub fn delete(conn: &mut Connection, id: i64, actor: &User) -> AppResult<Option<String>> {
    let tx = conn.transaction()?;
    let post = load(&tx, id)?;
    if !can_manage(&post, actor) {
        return Err(AppError::Forbidden(
            "You can only delete your own posts".into(),
        ));
    }
    repo::delete(&tx, id)?;
    let orphaned = match post.media_url.as_deref() {
        Some(url) => media::release(&tx, url, post.author.id)?,
        None => None,
    };
    tx.commit()?;

    tracing::info!(post_id = id, by = %actor.username, "Post deleted");
    Ok(orphaned)
}

/// Like a post. Liking twice leaves the counter where it was.
pub fn like(conn: &mut Connection, id: i64, user: &User) -> AppResult<Post> {
    let tx = conn.transaction()?;
    let post = get(&tx, id, Some(user))?;
    if repo::insert_like(&tx, user.id, id)? > 0 {
        repo::adjust_like_count(&tx, id, 1)?;
        fan_out(
            &tx,
            NotificationEvent::PostLike {
                liker: user,
                post_id: id,
                post_author_id: post.author.id,
                title: &post.title,
            },
        )?;
    }
    let post = load(&tx, id)?;
    tx.commit()?;
    Ok(post)
}

/// Remove a like. Unliking a post that was never liked returns it unchanged.
pub fn unlike(conn: &mut Connection, id: i64, user: &User) -> AppResult<Post> {
    let tx = conn.transaction()?;
    get(&tx, id, Some(user))?;
    if repo::delete_like(&tx, user.id, id)? > 0 {
        repo::adjust_like_count(&tx, id, -1)?;
    }
    let post = load(&tx, id)?;
    tx.commit()?;
    Ok(post)
}

pub fn has_liked(conn: &Connection, id: i64, user: &User) -> AppResult<bool> {
    get(conn, id, Some(user))?;
    Ok(repo::like_exists(conn, user.id, id)?)
}

pub fn set_hidden(conn: &Connection, id: i64, hidden: bool) -> AppResult<()> {
    if repo::set_hidden(conn, id, hidden)? == 0 {
        return Err(AppError::not_found("Post"));
    }
    tracing::info!(post_id = id, hidden, "Post visibility changed");
    Ok(())
}

/// A comment, provided it sits under `post_id`.
pub(crate) fn require_comment(conn: &Connection, post_id: i64, comment_id: i64) -> AppResult<Comment> {
    match comment_repo::find(conn, comment_id)? {
        Some(comment) if comment.post_id == post_id => Ok(comment),
        _ => Err(AppError::not_found("Comment")),
    }
}
