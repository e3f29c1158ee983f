use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::db::models::{Role, User};
use crate::error::AppResult;
use crate::extractors::AppJson;
use crate::services::users::{self, LoginInput, RegisterInput};
use crate::state::AppState;

/// Returned by register and login. Refresh tokens are not issued.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

fn auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let access_token = state.tokens.issue(&user.username)?;
    Ok(AuthResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
        access_token,
        refresh_token: None,
    })
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterInput>,
) -> AppResult<Json<AuthResponse>> {
    let user = {
        let mut conn = state.db.get()?;
        users::register(&mut conn, input)?
    };
    Ok(Json(auth_response(&state, user)?))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginInput>,
) -> AppResult<Json<AuthResponse>> {
    let user = {
        let conn = state.db.get()?;
        users::login(&conn, &input)?
    };
    Ok(Json(auth_response(&state, user)?))
}
