//! Account registration and JWT token service.
//!
//! Accounts are keyed by unique email and hold an argon2 password hash.
//! Authenticated clients exchange credentials for an access/refresh token
//! pair; refresh tokens mint new access tokens and can be revoked.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::http::AppState;
pub use services::AccountService;

use axum::routing::{get, post};
use handlers::http;
use tower_http::trace::TraceLayer;

/// Build the API router. Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/register", post(auth::register))
        .route("/token", post(auth::obtain_token))
        .route("/token/refresh", post(auth::refresh_token))
        .route("/token/verify", post(auth::verify_token))
        .route("/token/revoke", post(auth::revoke_token))
        .route("/aboutme", get(http::about_me).patch(http::update_me))
        .route("/health", get(http::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
