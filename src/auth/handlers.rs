//! Auth HTTP handlers: register, token obtain/refresh/verify/revoke.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::{Validate, ValidationErrors};

use crate::auth::TokenPair;
use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::AppJson;
use crate::models::AccountView;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Email must be between 1 and 255 characters"))]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Short per-field messages; the submitted values are never echoed back.
fn field_messages(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("Invalid value for {}", field),
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages.join("; ")
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountView>), AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(field_messages(&e)))?;
    let account = state
        .accounts()
        .register(&body.email, &body.name, &body.password)
        .await?;
    Ok((StatusCode::CREATED, Json(AccountView::from(&account))))
}

/// POST /token
pub async fn obtain_token(
    State(state): State<AppState>,
    AppJson(body): AppJson<TokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let account = state
        .accounts()
        .authenticate(&body.email, &body.password)
        .await?;
    let pair = state.tokens().issue_pair(account.id)?;
    Ok(Json(pair))
}

/// POST /token/refresh — the account behind the token must still exist and be active.
pub async fn refresh_token(
    State(state): State<AppState>,
    AppJson(body): AppJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let account_id = state.tokens().refresh_subject(&body.refresh).await?;
    let account = state
        .accounts()
        .get_active(account_id)
        .await
        .map_err(|e| match e {
            AppError::NotFound => AppError::InvalidCredentials,
            other => other,
        })?;
    let access = state.tokens().issue_access(account.id)?;
    Ok(Json(RefreshResponse { access }))
}

/// POST /token/verify — empty object on success.
pub async fn verify_token(
    State(state): State<AppState>,
    AppJson(body): AppJson<VerifyRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.tokens().verify(&body.token).await?;
    Ok(Json(json!({})))
}

/// POST /token/revoke — logout: the refresh token can no longer be used.
pub async fn revoke_token(
    State(state): State<AppState>,
    AppJson(body): AppJson<RefreshRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.tokens().revoke(&body.refresh).await?;
    Ok(Json(json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_messages_do_not_echo_values() {
        let body = RegisterRequest {
            email: format!("{}@email.com", "a".repeat(300)),
            name: String::new(),
            password: "testpass123".to_string(),
        };
        let message = field_messages(&body.validate().unwrap_err());
        assert_eq!(
            message,
            "Email must be between 1 and 255 characters; Name must be between 1 and 255 characters"
        );
        assert!(!message.contains("aaaa"));
    }
}
