// Library exports for the blogger backend.
// The binary and the integration tests build the router through `app`.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full HTTP surface with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let upload_limit = state.config.storage.max_upload_bytes;

    Router::new()
        .merge(routes::auth::router())
        .merge(routes::posts::router(upload_limit))
        .merge(routes::users::router(upload_limit))
        .merge(routes::admin::router())
        .merge(routes::reports::router())
        .merge(routes::notifications::router())
        .merge(routes::uploads::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
