//! Ownership of uploaded files. A file on disk is only removed once the user
//! who uploaded it lets go of it and nothing else still points at its URL.

use rusqlite::Connection;

use crate::error::AppResult;
use crate::repository::uploads as repo;

pub fn record(conn: &Connection, url: &str, owner_id: i64) -> AppResult<()> {
    repo::insert(conn, url, owner_id)?;
    Ok(())
}

/// Called after `owner_id` stopped using `url`. Returns the URL when its file
/// can be deleted, and forgets the upload in that case.
pub fn release(conn: &Connection, url: &str, owner_id: i64) -> AppResult<Option<String>> {
    if repo::owner(conn, url)? != Some(owner_id) || repo::is_referenced(conn, url)? {
        return Ok(None);
    }
    repo::delete(conn, url)?;
    Ok(Some(url.to_string()))
}
