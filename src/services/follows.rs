use rusqlite::Connection;

use crate::db::models::{FollowEntry, FollowStats, User};
use crate::error::{AppError, AppResult};
use crate::repository::{follows as repo, users as user_repo};
use crate::services::notifications::{fan_out, NotificationEvent};

pub fn follow(conn: &mut Connection, follower: &User, target_id: i64) -> AppResult<()> {
    if follower.id == target_id {
        return Err(AppError::BadRequest("You cannot follow yourself".into()));
    }

    let tx = conn.transaction()?;
    let target =
        user_repo::find_by_id(&tx, target_id)?.ok_or_else(|| AppError::not_found("User"))?;
    if repo::exists(&tx, follower.id, target.id)? {
        return Err(AppError::BadRequest(format!(
            "You are already following {}",
            target.username
        )));
    }
    repo::insert(&tx, follower.id, target.id)?;
    fan_out(
        &tx,
        NotificationEvent::NewFollower {
            follower,
            followed_id: target.id,
        },
    )?;
    tx.commit()?;

    tracing::info!(follower = %follower.username, following = %target.username, "Followed");
    Ok(())
}

pub fn unfollow(conn: &Connection, follower: &User, target_id: i64) -> AppResult<()> {
    if user_repo::find_by_id(conn, target_id)?.is_none() {
        return Err(AppError::not_found("User"));
    }
    if repo::delete(conn, follower.id, target_id)? == 0 {
        return Err(AppError::BadRequest(
            "You are not following this user".into(),
        ));
    }
    Ok(())
}

pub fn is_following(conn: &Connection, follower_id: i64, target_id: i64) -> AppResult<bool> {
    Ok(repo::exists(conn, follower_id, target_id)?)
}

pub fn following(conn: &Connection, user_id: i64) -> AppResult<Vec<FollowEntry>> {
    Ok(repo::following_entries(conn, user_id)?)
}

pub fn followers(conn: &Connection, user_id: i64) -> AppResult<Vec<FollowEntry>> {
    Ok(repo::follower_entries(conn, user_id)?)
}

pub fn stats(conn: &Connection, user_id: i64) -> AppResult<FollowStats> {
    if user_repo::find_by_id(conn, user_id)?.is_none() {
        return Err(AppError::not_found("User"));
    }
    Ok(repo::stats(conn, user_id)?)
}
