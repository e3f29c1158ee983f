use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, put};
use axum::{Json, Router};

use crate::db::models::Notification;
use crate::error::AppResult;
use crate::extractors::{ActiveUser, CurrentUser};
use crate::routes::{Count, Message, PageQuery};
use crate::services::notifications::{self, NotificationPage};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/notifications", get(list))
        .route("/auth/notifications/", get(list))
        .route("/auth/notifications/paginated", get(paginated))
        .route("/auth/notifications/unread", get(unread))
        .route("/auth/notifications/unread/count", get(unread_count))
        .route("/auth/notifications/read-all", put(mark_all_read))
        .route("/auth/notifications/read", delete(delete_read))
        .route("/auth/notifications/{id}", delete(delete_one))
        .route("/auth/notifications/{id}/read", put(mark_read))
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Notification>>> {
    let conn = state.db.get()?;
    Ok(Json(notifications::list(&conn, user.id)?))
}

async fn paginated(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<NotificationPage>> {
    let conn = state.db.get()?;
    let page = notifications::page(
        &conn,
        user.id,
        query.page.unwrap_or(0),
        query.size.unwrap_or(20),
    )?;
    Ok(Json(page))
}

async fn unread(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Notification>>> {
    let conn = state.db.get()?;
    Ok(Json(notifications::unread(&conn, user.id)?))
}

async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Count>> {
    let conn = state.db.get()?;
    Ok(Json(Count {
        count: notifications::count_unread(&conn, user.id)?,
    }))
}

async fn mark_read(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Message>> {
    let mut conn = state.db.get()?;
    notifications::mark_read(&mut conn, id, user.id)?;
    Ok(Json(Message::new("Notification marked as read")))
}

async fn mark_all_read(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
) -> AppResult<Json<Message>> {
    let conn = state.db.get()?;
    notifications::mark_all_read(&conn, user.id)?;
    Ok(Json(Message::new("All notifications marked as read")))
}

async fn delete_one(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Message>> {
    let mut conn = state.db.get()?;
    notifications::delete(&mut conn, id, user.id)?;
    Ok(Json(Message::new("Notification deleted successfully")))
}

async fn delete_read(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
) -> AppResult<Json<Message>> {
    let conn = state.db.get()?;
    notifications::delete_read(&conn, user.id)?;
    Ok(Json(Message::new("Read notifications deleted successfully")))
}
