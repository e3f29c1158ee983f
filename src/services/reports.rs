use rusqlite::Connection;
use serde::Deserialize;
use validator::Validate;

use crate::db::models::{Report, User};
use crate::error::{AppError, AppResult};
use crate::repository::reports as repo;
use crate::services::posts;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    pub post_id: i64,
    #[validate(length(max = 1000, message = "Message must be at most 1000 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportUpdate {
    #[serde(default)]
    pub resolved: bool,
    #[validate(length(max = 1000, message = "Admin notes must be at most 1000 characters"))]
    pub admin_notes: Option<String>,
}

fn load(conn: &Connection, id: i64) -> AppResult<Report> {
    repo::find(conn, id)?.ok_or_else(|| AppError::not_found("Report"))
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn create(conn: &mut Connection, reporter: &User, input: ReportInput) -> AppResult<Report> {
    input.validate()?;

    let tx = conn.transaction()?;
    posts::get(&tx, input.post_id, Some(reporter))?;
    let id = repo::insert(
        &tx,
        reporter.id,
        input.post_id,
        trimmed(input.message.as_deref()),
    )?;
    let report = load(&tx, id)?;
    tx.commit()?;

    tracing::info!(report_id = id, post_id = input.post_id, reporter = %reporter.username, "Post reported");
    Ok(report)
}

pub fn mine(conn: &Connection, reporter_id: i64) -> AppResult<Vec<Report>> {
    Ok(repo::by_reporter(conn, reporter_id)?)
}

pub fn all(conn: &Connection) -> AppResult<Vec<Report>> {
    Ok(repo::all(conn)?)
}

pub fn unresolved(conn: &Connection) -> AppResult<Vec<Report>> {
    Ok(repo::unresolved(conn)?)
}

pub fn count_unresolved(conn: &Connection) -> AppResult<i64> {
    Ok(repo::count_unresolved(conn)?)
}

pub fn update(conn: &mut Connection, id: i64, update: ReportUpdate) -> AppResult<Report> {
    update.validate()?;

    let tx = conn.transaction()?;
    load(&tx, id)?;
    repo::update(
        &tx,
        id,
        update.resolved,
        trimmed(update.admin_notes.as_deref()),
    )?;
    let report = load(&tx, id)?;
    tx.commit()?;

    tracing::info!(report_id = id, resolved = report.resolved, "Report updated");
    Ok(report)
}

pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    if repo::delete(conn, id)? == 0 {
        return Err(AppError::not_found("Report"));
    }
    Ok(())
}
