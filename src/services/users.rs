use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::config::AdminConfig;
use crate::db::models::{Role, User};
use crate::error::{AppError, AppResult, FieldErrors};
use crate::repository::{
    comments as comment_repo, follows, posts as post_repo, uploads as upload_repo, users as repo,
};
use crate::services::media;

pub const MIN_PASSWORD: usize = 6;

const BANNED_MESSAGE: &str = "Your account has been banned. Please contact support.";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterInput {
    #[serde(default)]
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        custom(
            function = "crate::validation::no_whitespace",
            message = "Username cannot contain spaces"
        )
    )]
    pub username: String,
    #[serde(default)]
    #[validate(
        custom(function = "crate::validation::not_blank", message = "Email is required"),
        email(message = "Email must be a valid address"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Either identifier may be given; email wins when both are present.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginInput {
    pub email: Option<String>,
    pub username: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginInput {
    fn identifier(&self) -> Option<&str> {
        [self.email.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

/// Profile edit. Missing fields are left alone; empty strings clear the field.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    #[validate(length(max = 100, message = "Full name must be at most 100 characters"))]
    pub full_name: Option<String>,
    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,
    #[validate(length(max = 500, message = "Avatar must be at most 500 characters"))]
    pub avatar: Option<String>,
    #[validate(length(
        max = 500,
        message = "Profile picture URL must be at most 500 characters"
    ))]
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Public profile plus the counters the directory shows next to it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub post_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
}

fn load(conn: &Connection, id: i64) -> AppResult<User> {
    repo::find_by_id(conn, id)?.ok_or_else(|| AppError::not_found("User"))
}

fn profile_of(conn: &Connection, user: User, viewer_id: Option<i64>) -> AppResult<UserProfile> {
    let stats = follows::stats(conn, user.id)?;
    let is_following = match viewer_id {
        Some(viewer) if viewer != user.id => Some(follows::exists(conn, viewer, user.id)?),
        Some(_) => Some(false),
        None => None,
    };
    Ok(UserProfile {
        post_count: post_repo::count_by_author(conn, user.id)?,
        followers_count: stats.followers_count,
        following_count: stats.following_count,
        is_following,
        user,
    })
}

fn self_or_admin(target_id: i64, actor: &User, action: &str) -> AppResult<()> {
    if actor.id == target_id || actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "You can only {action} your own account"
        )))
    }
}

fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn register(conn: &mut Connection, input: RegisterInput) -> AppResult<User> {
    input.validate()?;
    let username = input.username.trim();
    let email = input.email.trim();
    let hash = hash_password(&input.password)?;

    let tx = conn.transaction()?;
    if repo::find_by_email(&tx, email)?.is_some() {
        return Err(AppError::Conflict("Email already in use".into()));
    }
    if repo::find_by_username(&tx, username)?.is_some() {
        return Err(AppError::Conflict("Username already in use".into()));
    }
    let id = repo::insert(&tx, username, email, &hash, Role::User)?;
    let user = load(&tx, id)?;
    tx.commit()?;

    tracing::info!(user_id = id, username = %user.username, "User registered");
    Ok(user)
}

/// Check credentials. The identifier is tried as an email, then as a username.
pub fn login(conn: &Connection, input: &LoginInput) -> AppResult<User> {
    let Some(identifier) = input.identifier() else {
        let mut errors = FieldErrors::new();
        errors.insert("email".into(), "Email or username is required".into());
        return Err(AppError::Validation(errors));
    };
    input.validate()?;

    let user = match repo::find_by_email(conn, identifier)? {
        Some(user) => Some(user),
        None => repo::find_by_username(conn, identifier)?,
    };
    let user = match user {
        Some(user) if verify_password(&input.password, &user.password_hash) => user,
        _ => {
            tracing::warn!(identifier, "Login failed");
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }
    };
    if user.is_banned {
        tracing::warn!(username = %user.username, "Login blocked for banned user");
        return Err(AppError::Forbidden(BANNED_MESSAGE.into()));
    }

    tracing::info!(username = %user.username, "User logged in");
    Ok(user)
}

pub fn get(conn: &Connection, id: i64, viewer_id: Option<i64>) -> AppResult<UserProfile> {
    let user = load(conn, id)?;
    profile_of(conn, user, viewer_id)
}

pub fn directory(conn: &Connection, viewer_id: i64) -> AppResult<Vec<UserProfile>> {
    repo::list_all(conn)?
        .into_iter()
        .map(|user| profile_of(conn, user, Some(viewer_id)))
        .collect()
}

pub fn list(conn: &Connection) -> AppResult<Vec<User>> {
    Ok(repo::list_all(conn)?)
}

pub fn update_profile(
    conn: &mut Connection,
    id: i64,
    actor: &User,
    input: ProfileInput,
) -> AppResult<User> {
    self_or_admin(id, actor, "edit")?;
    input.validate()?;

    let tx = conn.transaction()?;
    let mut user = load(&tx, id)?;
    if let Some(full_name) = input.full_name {
        user.full_name = blank_to_none(full_name);
    }
    if let Some(bio) = input.bio {
        user.bio = blank_to_none(bio);
    }
    if let Some(avatar) = input.avatar {
        user.avatar = blank_to_none(avatar);
    }
    if let Some(url) = input.profile_picture_url {
        user.profile_picture_url = blank_to_none(url);
    }
    repo::update_profile(&tx, &user)?;
    let user = load(&tx, id)?;
    tx.commit()?;

    Ok(user)
}

/// Point the user's profile picture at a freshly stored upload. Returns the
/// previous picture when its file is no longer used by anyone.
pub fn set_profile_picture(
    conn: &mut Connection,
    user: &User,
    url: &str,
) -> AppResult<Option<String>> {
    let tx = conn.transaction()?;
    let mut current = load(&tx, user.id)?;
    media::record(&tx, url, user.id)?;
    let previous = current.profile_picture_url.replace(url.to_string());
    repo::update_profile(&tx, &current)?;
    let released = match previous.as_deref() {
        Some(old) if old != url => media::release(&tx, old, user.id)?,
        _ => None,
    };
    tx.commit()?;

    Ok(released)
}

pub fn change_password(
    conn: &Connection,
    id: i64,
    actor: &User,
    change: &PasswordChange,
) -> AppResult<()> {
    if actor.id != id {
        return Err(AppError::Forbidden(
            "You can only change your own password".into(),
        ));
    }
    let user = load(conn, id)?;
    if !verify_password(&change.current_password, &user.password_hash) {
        return Err(AppError::BadRequest("Current password is incorrect".into()));
    }
    if change.new_password != change.confirm_password {
        return Err(AppError::BadRequest("New passwords do not match".into()));
    }
    if change.new_password.chars().count() < MIN_PASSWORD {
        return Err(AppError::BadRequest(format!(
            "New password must be at least {MIN_PASSWORD} characters"
        )));
    }

    repo::set_password_hash(conn, id, &hash_password(&change.new_password)?)?;
    tracing::info!(user_id = id, "Password changed");
    Ok(())
}

/// Remove an account and everything it owns. Like counters on content the
/// user had liked are lowered before the cascade drops the like rows.
/// Returns the URLs of files the user uploaded that nothing points at any more.
pub fn delete(conn: &mut Connection, id: i64, actor: &User) -> AppResult<Vec<String>> {
    self_or_admin(id, actor, "delete")?;

    let tx = conn.transaction()?;
    let user = load(&tx, id)?;
    let mut candidates = post_repo::media_urls_by_author(&tx, id)?;
    candidates.extend(user.profile_picture_url.clone());
    candidates.sort();
    candidates.dedup();
    let mut owned = Vec::new();
    for url in candidates {
        if upload_repo::owner(&tx, &url)? == Some(id) {
            owned.push(url);
        }
    }

    post_repo::release_likes_of(&tx, id)?;
    comment_repo::release_likes_of(&tx, id)?;
    repo::delete(&tx, id)?;

    let mut orphaned = Vec::new();
    for url in owned {
        if !upload_repo::is_referenced(&tx, &url)? {
            orphaned.push(url);
        }
    }
    tx.commit()?;

    tracing::info!(user_id = id, username = %user.username, by = %actor.username, "User deleted");
    Ok(orphaned)
}

pub fn set_banned(conn: &Connection, id: i64, banned: bool) -> AppResult<User> {
    if repo::set_banned(conn, id, banned)? == 0 {
        return Err(AppError::not_found("User"));
    }
    let user = load(conn, id)?;
    tracing::info!(username = %user.username, banned, "Ban state changed");
    Ok(user)
}

pub fn set_role(conn: &Connection, id: i64, role: Role) -> AppResult<User> {
    if repo::set_role(conn, id, role)? == 0 {
        return Err(AppError::not_found("User"));
    }
    let user = load(conn, id)?;
    tracing::info!(username = %user.username, role = %role, "Role changed");
    Ok(user)
}

/// Create the configured administrator unless that username already exists.
/// Returns whether an account was created.
pub fn ensure_admin(conn: &Connection, admin: &AdminConfig) -> AppResult<bool> {
    if repo::find_by_username(conn, &admin.username)?.is_some() {
        return Ok(false);
    }
    let hash = hash_password(&admin.password)?;
    repo::insert(conn, &admin.username, &admin.email, &hash, Role::Admin)?;
    tracing::info!(username = %admin.username, "Default admin account created");
    Ok(true)
}
