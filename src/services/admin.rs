use rusqlite::Connection;

use crate::error::AppResult;
use crate::repository::stats::{self as stats_repo, AdminStats};

pub fn stats(conn: &Connection) -> AppResult<AdminStats> {
    Ok(stats_repo::snapshot(conn)?)
}
