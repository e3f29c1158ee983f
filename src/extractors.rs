use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;

use crate::db::models::User;
use crate::error::AppError;
use crate::repository::users;
use crate::state::AppState;

/// The authenticated caller, reloaded from the database on every request so
/// role and ban changes apply immediately.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Returns 401 unless a valid bearer token for an existing user is present.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

        let claims = state.tokens.verify(token).map_err(|e| {
            tracing::warn!("Rejected access token: {}", e);
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        let conn = state.db.get()?;
        users::find_by_username(&conn, &claims.sub)?
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))
    }
}

/// Optional user extractor. Returns None instead of 401 when not authenticated.
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(CurrentUser(user)) => Ok(MaybeUser(Some(user))),
            Err(_) => Ok(MaybeUser(None)),
        }
    }
}

/// Authenticated and not banned. Every mutating endpoint takes this, so a
/// banned account is turned away before the handler runs.
#[derive(Debug, Clone)]
pub struct ActiveUser(pub User);

impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.is_banned {
            tracing::warn!(username = %user.username, "Banned user attempted a write");
            return Err(AppError::Forbidden(
                "User account is banned and cannot perform this action".into(),
            ));
        }
        Ok(ActiveUser(user))
    }
}

/// Authenticated administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".into()));
        }
        Ok(AdminUser(user))
    }
}

/// JSON body whose rejections come back in the usual error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
