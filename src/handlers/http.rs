//! HTTP handlers: health and the authenticated profile endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;

use crate::auth::TokenService;
use crate::error::AppError;
use crate::middleware::{AppJson, AuthUser};
use crate::models::{AccountView, ProfileUpdate};
use crate::services::AccountService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub tokens: TokenService,
}

impl AppState {
    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}

/// GET /aboutme
pub async fn about_me(
    State(state): State<AppState>,
    AuthUser(account_id): AuthUser,
) -> Result<Json<AccountView>, AppError> {
    let account = state.accounts().get_active(account_id).await?;
    Ok(Json(AccountView::from(&account)))
}

/// PATCH /aboutme — any of `email`, `name`, `password`.
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(account_id): AuthUser,
    AppJson(body): AppJson<ProfileUpdate>,
) -> Result<Json<AccountView>, AppError> {
    state.accounts().get_active(account_id).await?;
    let account = state.accounts().update_profile(account_id, body).await?;
    Ok(Json(AccountView::from(&account)))
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "accounts" })),
    )
}
