use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::Report;

const REPORT_SELECT: &str = "SELECT r.id, r.post_id, p.title, r.reporter_id, u.username,
        r.message, r.resolved, r.admin_notes, r.created_at
 FROM reports r
 JOIN posts p ON p.id = r.post_id
 JOIN users u ON u.id = r.reporter_id";

fn map_report(row: &Row<'_>) -> rusqlite::Result<Report> {
    Ok(Report {
        id: row.get(0)?,
        post_id: row.get(1)?,
        post_title: row.get(2)?,
        reporter_id: row.get(3)?,
        reporter_username: row.get(4)?,
        message: row.get(5)?,
        resolved: row.get(6)?,
        admin_notes: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn query_reports(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<Report>> {
    let mut stmt = conn.prepare(sql)?;
    let reports = stmt
        .query_map(params, map_report)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(reports)
}

pub fn insert(
    conn: &Connection,
    reporter_id: i64,
    post_id: i64,
    message: Option<&str>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO reports (reporter_id, post_id, message) VALUES (?1, ?2, ?3)",
        params![reporter_id, post_id, message],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Report>> {
    conn.query_row(
        &format!("{REPORT_SELECT} WHERE r.id = ?1"),
        params![id],
        map_report,
    )
    .optional()
}

pub fn all(conn: &Connection) -> rusqlite::Result<Vec<Report>> {
    query_reports(
        conn,
        &format!("{REPORT_SELECT} ORDER BY r.created_at DESC, r.id DESC"),
        [],
    )
}

pub fn unresolved(conn: &Connection) -> rusqlite::Result<Vec<Report>> {
    query_reports(
        conn,
        &format!("{REPORT_SELECT} WHERE r.resolved = 0 ORDER BY r.created_at DESC, r.id DESC"),
        [],
    )
}

pub fn by_reporter(conn: &Connection, reporter_id: i64) -> rusqlite::Result<Vec<Report>> {
    query_reports(
        conn,
        &format!("{REPORT_SELECT} WHERE r.reporter_id = ?1 ORDER BY r.created_at DESC, r.id DESC"),
        params![reporter_id],
    )
}

pub fn update(
    conn: &Connection,
    id: i64,
    resolved: bool,
    admin_notes: Option<&str>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE reports SET resolved = ?2, admin_notes = ?3 WHERE id = ?1",
        params![id, resolved, admin_notes],
    )
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM reports WHERE id = ?1", params![id])
}

pub fn count_unresolved(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM reports WHERE resolved = 0",
        [],
        |row| row.get(0),
    )
}
