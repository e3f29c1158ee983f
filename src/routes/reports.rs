use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::db::models::Report;
use crate::error::AppResult;
use crate::extractors::{ActiveUser, AdminUser, AppJson, CurrentUser};
use crate::routes::{Count, Message};
use crate::services::reports::{self, ReportInput, ReportUpdate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/reports", post(create_report))
        .route("/auth/reports/my", get(my_reports))
        .route("/auth/reports/admin/all", get(all_reports))
        .route("/auth/reports/admin/unresolved", get(unresolved_reports))
        .route("/auth/reports/admin/count-unresolved", get(count_unresolved))
        .route(
            "/auth/reports/admin/{id}",
            put(update_report).delete(delete_report),
        )
}

async fn create_report(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    AppJson(input): AppJson<ReportInput>,
) -> AppResult<(StatusCode, Json<Report>)> {
    let mut conn = state.db.get()?;
    let report = reports::create(&mut conn, &user, input)?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn my_reports(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Report>>> {
    let conn = state.db.get()?;
    Ok(Json(reports::mine(&conn, user.id)?))
}

async fn all_reports(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<Report>>> {
    let conn = state.db.get()?;
    Ok(Json(reports::all(&conn)?))
}

async fn unresolved_reports(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<Report>>> {
    let conn = state.db.get()?;
    Ok(Json(reports::unresolved(&conn)?))
}

async fn count_unresolved(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Count>> {
    let conn = state.db.get()?;
    Ok(Json(Count {
        count: reports::count_unresolved(&conn)?,
    }))
}

async fn update_report(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    AppJson(update): AppJson<ReportUpdate>,
) -> AppResult<Json<Report>> {
    let mut conn = state.db.get()?;
    Ok(Json(reports::update(&mut conn, id, update)?))
}

async fn delete_report(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Message>> {
    let conn = state.db.get()?;
    reports::delete(&conn, id)?;
    Ok(Json(Message::new("Report deleted successfully")))
}
