use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::models::{Role, User};
use crate::error::{AppError, AppResult};
use crate::extractors::{AdminUser, AppJson};
use crate::repository::stats::AdminStats;
use crate::routes::{Message, PageQuery};
use crate::services::posts::{self, PostPage};
use crate::services::{admin, users};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/admin/stats", get(stats))
        .route("/auth/admin/users", get(list_users))
        .route("/auth/admin/users/{id}", delete(delete_user))
        .route("/auth/admin/users/{id}/ban", put(ban_user))
        .route("/auth/admin/users/{id}/unban", put(unban_user))
        .route("/auth/admin/users/{id}/role", put(change_role))
        .route("/auth/admin/posts", get(list_posts))
        .route("/auth/admin/posts/{id}", delete(delete_post))
        .route("/auth/admin/posts/{id}/hide", put(hide_post))
        .route("/auth/admin/posts/{id}/unhide", put(unhide_post))
}

#[derive(Deserialize)]
struct RoleInput {
    role: String,
}

#[derive(Serialize)]
struct UserAction {
    message: &'static str,
    user: User,
}

async fn stats(State(state): State<AppState>, _admin: AdminUser) -> AppResult<Json<AdminStats>> {
    let conn = state.db.get()?;
    Ok(Json(admin::stats(&conn)?))
}

async fn list_users(State(state): State<AppState>, _admin: AdminUser) -> AppResult<Json<Vec<User>>> {
    let conn = state.db.get()?;
    Ok(Json(users::list(&conn)?))
}

async fn ban_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserAction>> {
    let conn = state.db.get()?;
    Ok(Json(UserAction {
        message: "User banned successfully",
        user: users::set_banned(&conn, id, true)?,
    }))
}

async fn unban_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserAction>> {
    let conn = state.db.get()?;
    Ok(Json(UserAction {
        message: "User unbanned successfully",
        user: users::set_banned(&conn, id, false)?,
    }))
}

async fn change_role(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    AppJson(input): AppJson<RoleInput>,
) -> AppResult<Json<UserAction>> {
    let role: Role = input
        .role
        .parse()
        .map_err(|_| AppError::BadRequest("Role must be USER or ADMIN".into()))?;
    let conn = state.db.get()?;
    Ok(Json(UserAction {
        message: "User role updated successfully",
        user: users::set_role(&conn, id, role)?,
    }))
}

async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Message>> {
    let media = {
        let mut conn = state.db.get()?;
        users::delete(&mut conn, id, &admin)?
    };
    for url in &media {
        state.files.remove_url(url).await;
    }
    Ok(Json(Message::new("User deleted successfully")))
}

async fn list_posts(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PostPage>> {
    let conn = state.db.get()?;
    let page = posts::page_all(&conn, query.page.unwrap_or(1), query.size.unwrap_or(10))?;
    Ok(Json(page))
}

async fn hide_post(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Message>> {
    let conn = state.db.get()?;
    posts::set_hidden(&conn, id, true)?;
    Ok(Json(Message::new("Post hidden successfully")))
}

async fn unhide_post(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Message>> {
    let conn = state.db.get()?;
    posts::set_hidden(&conn, id, false)?;
    Ok(Json(Message::new("Post unhidden successfully")))
}

async fn delete_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Message>> {
    let orphaned = {
        let mut conn = state.db.get()?;
        posts::delete(&mut conn, id, &admin)?
    };
    if let Some(url) = orphaned.as_deref() {
        state.files.remove_url(url).await;
    }
    Ok(Json(Message::new("Post deleted successfully")))
}
