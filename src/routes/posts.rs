use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::db::models::{Comment, Post};
use crate::error::{AppError, AppResult};
use crate::extractors::{ActiveUser, AppJson, CurrentUser, MaybeUser};
use crate::routes::uploads::read_file_field;
use crate::routes::PageQuery;
use crate::services::comments::{self, CommentInput};
use crate::services::media;
use crate::services::posts::{self, PostInput, PostPage};
use crate::state::AppState;

pub fn router(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/auth/posts", get(list_posts).post(create_post))
        .route("/auth/posts/following", get(following_feed))
        .route(
            "/auth/posts/upload",
            post(upload_media).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/auth/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/auth/posts/{id}/like", post(like_post).delete(unlike_post))
        .route("/auth/posts/{id}/liked", get(has_liked_post))
        .route(
            "/auth/posts/{id}/comments",
            get(list_comments).post(add_comment),
        )
        .route(
            "/auth/posts/{id}/comments/{comment_id}/like",
            post(like_comment).delete(unlike_comment),
        )
        .route(
            "/auth/posts/{id}/comments/{comment_id}/liked",
            get(has_liked_comment),
        )
}

// --- Responses ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    filename: String,
    url: String,
    media_type: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentAdded {
    message: &'static str,
    comment_content: String,
    author: String,
    comment: Comment,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentLikeResponse {
    message: &'static str,
    like_count: i64,
}

// --- Handlers ---

async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PostPage>> {
    let conn = state.db.get()?;
    let page = posts::page_visible(
        &conn,
        query.page.unwrap_or(1),
        query.size.unwrap_or(10),
    )?;
    Ok(Json(page))
}

async fn following_feed(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Post>>> {
    let conn = state.db.get()?;
    Ok(Json(posts::following_feed(&conn, user.id)?))
}

async fn get_post(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Post>> {
    let conn = state.db.get()?;
    Ok(Json(posts::get(&conn, id, viewer.as_ref())?))
}

async fn create_post(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    AppJson(input): AppJson<PostInput>,
) -> AppResult<Json<Post>> {
    let mut conn = state.db.get()?;
    Ok(Json(posts::create(&mut conn, &user, input)?))
}

async fn upload_media(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let file = read_file_field(&mut multipart).await?;
    let stored = state
        .files
        .store(
            file.file_name.as_deref(),
            file.content_type.as_deref(),
            &file.data,
        )
        .await?;
    let recorded = state
        .db
        .get()
        .map_err(AppError::from)
        .and_then(|conn| media::record(&conn, &stored.url, user.id));
    if let Err(err) = recorded {
        state.files.remove_url(&stored.url).await;
        return Err(err);
    }
    tracing::debug!(username = %user.username, filename = %stored.filename, "Post media uploaded");

    Ok(Json(UploadResponse {
        filename: stored.filename,
        url: stored.url,
        media_type: stored.media_type,
    }))
}

async fn update_post(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
    AppJson(input): AppJson<PostInput>,
) -> AppResult<Json<Post>> {
    let mut conn = state.db.get()?;
    Ok(Json(posts::update(&mut conn, id, &user, input)?))
}

async fn delete_post(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let orphaned = {
        let mut conn = state.db.get()?;
        posts::delete(&mut conn, id, &user)?
    };
    if let Some(url) = orphaned.as_deref() {
        state.files.remove_url(url).await;
    }

    Ok(Json(json!({
        "success": true,
        "message": "Post deleted successfully",
    })))
}

async fn like_post(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Post>> {
    let mut conn = state.db.get()?;
    Ok(Json(posts::like(&mut conn, id, &user)?))
}

async fn unlike_post(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Post>> {
    let mut conn = state.db.get()?;
    Ok(Json(posts::unlike(&mut conn, id, &user)?))
}

async fn has_liked_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let conn = state.db.get()?;
    Ok(Json(posts::has_liked(&conn, id, &user)?))
}

async fn list_comments(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Comment>>> {
    let conn = state.db.get()?;
    Ok(Json(posts::comments(&conn, id, viewer.as_ref())?))
}

async fn add_comment(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
    AppJson(input): AppJson<CommentInput>,
) -> AppResult<Json<CommentAdded>> {
    let mut conn = state.db.get()?;
    let comment = comments::add(&mut conn, id, &user, input)?;
    Ok(Json(CommentAdded {
        message: "Comment added successfully",
        comment_content: comment.content.clone(),
        author: user.username,
        comment,
    }))
}

async fn like_comment(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path((id, comment_id)): Path<(i64, i64)>,
) -> AppResult<Json<CommentLikeResponse>> {
    let mut conn = state.db.get()?;
    let like_count = comments::like(&mut conn, id, comment_id, &user)?;
    Ok(Json(CommentLikeResponse {
        message: "Comment liked",
        like_count,
    }))
}

async fn unlike_comment(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path((id, comment_id)): Path<(i64, i64)>,
) -> AppResult<Json<CommentLikeResponse>> {
    let mut conn = state.db.get()?;
    let like_count = comments::unlike(&mut conn, id, comment_id, &user)?;
    Ok(Json(CommentLikeResponse {
        message: "Comment unliked",
        like_count,
    }))
}

async fn has_liked_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, comment_id)): Path<(i64, i64)>,
) -> AppResult<Json<bool>> {
    let conn = state.db.get()?;
    Ok(Json(comments::has_liked(&conn, id, comment_id, &user)?))
}
