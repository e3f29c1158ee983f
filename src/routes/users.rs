use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;

use crate::db::models::{FollowEntry, FollowStats, Post, User};
use crate::error::{AppError, AppResult};
use crate::extractors::{ActiveUser, AppJson, CurrentUser, MaybeUser};
use crate::routes::uploads::read_file_field;
use crate::routes::Message;
use crate::services::users::{self, PasswordChange, ProfileInput, UserProfile};
use crate::services::{follows, posts};
use crate::state::AppState;

pub fn router(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/auth/users", get(directory))
        .route("/auth/users/me", get(me))
        .route("/auth/users/following", get(following))
        .route("/auth/users/followers", get(followers))
        .route(
            "/auth/users/upload-profile-picture",
            post(upload_profile_picture).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/auth/users/{id}",
            get(profile).put(update_profile).delete(delete_user),
        )
        .route("/auth/users/{id}/posts", get(posts_by_user))
        .route("/auth/users/{id}/follow-stats", get(follow_stats))
        .route("/auth/users/{id}/password", put(change_password))
        .route("/auth/users/{id}/follow", post(follow).delete(unfollow))
        .route("/auth/users/{id}/is-following", get(is_following))
}

#[derive(Serialize)]
struct ProfilePictureResponse {
    filename: String,
    url: String,
    message: &'static str,
}

async fn directory(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<UserProfile>>> {
    let conn = state.db.get()?;
    Ok(Json(users::directory(&conn, user.id)?))
}

async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let conn = state.db.get()?;
    Ok(Json(users::get(&conn, user.id, None)?))
}

async fn profile(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserProfile>> {
    let conn = state.db.get()?;
    Ok(Json(users::get(&conn, id, viewer.map(|v| v.id))?))
}

async fn posts_by_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Post>>> {
    let conn = state.db.get()?;
    Ok(Json(posts::by_author(&conn, id)?))
}

async fn follow_stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<FollowStats>> {
    let conn = state.db.get()?;
    Ok(Json(follows::stats(&conn, id)?))
}

async fn update_profile(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
    AppJson(input): AppJson<ProfileInput>,
) -> AppResult<Json<User>> {
    let mut conn = state.db.get()?;
    Ok(Json(users::update_profile(&mut conn, id, &user, input)?))
}

async fn change_password(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
    AppJson(change): AppJson<PasswordChange>,
) -> AppResult<Json<Message>> {
    let conn = state.db.get()?;
    users::change_password(&conn, id, &user, &change)?;
    Ok(Json(Message::new("Password changed successfully")))
}

async fn delete_user(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Message>> {
    let media = {
        let mut conn = state.db.get()?;
        users::delete(&mut conn, id, &user)?
    };
    for url in &media {
        state.files.remove_url(url).await;
    }
    Ok(Json(Message::new("User deleted successfully")))
}

async fn follow(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Message>> {
    let mut conn = state.db.get()?;
    follows::follow(&mut conn, &user, id)?;
    Ok(Json(Message::new("Followed successfully")))
}

async fn unfollow(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Message>> {
    let conn = state.db.get()?;
    follows::unfollow(&conn, &user, id)?;
    Ok(Json(Message::new("Unfollowed successfully")))
}

async fn is_following(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let conn = state.db.get()?;
    Ok(Json(follows::is_following(&conn, user.id, id)?))
}

async fn following(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<FollowEntry>>> {
    let conn = state.db.get()?;
    Ok(Json(follows::following(&conn, user.id)?))
}

async fn followers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<FollowEntry>>> {
    let conn = state.db.get()?;
    Ok(Json(follows::followers(&conn, user.id)?))
}

async fn upload_profile_picture(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    mut multipart: Multipart,
) -> AppResult<Json<ProfilePictureResponse>> {
    let file = read_file_field(&mut multipart).await?;
    if !file
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("image/"))
    {
        return Err(AppError::BadRequest("Only image files are allowed".into()));
    }

    let stored = state
        .files
        .store(
            file.file_name.as_deref(),
            file.content_type.as_deref(),
            &file.data,
        )
        .await?;
    let replaced = state
        .db
        .get()
        .map_err(AppError::from)
        .and_then(|mut conn| users::set_profile_picture(&mut conn, &user, &stored.url));
    match replaced {
        Ok(Some(old)) => state.files.remove_url(&old).await,
        Ok(None) => {}
        Err(err) => {
            state.files.remove_url(&stored.url).await;
            return Err(err);
        }
    }

    Ok(Json(ProfilePictureResponse {
        filename: stored.filename,
        url: stored.url,
        message: "Profile picture uploaded successfully",
    }))
}
