//! Application error types and their HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::PasswordError;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("An account with this email already exists")]
    DuplicateAccount,

    /// Unknown email, wrong password and inactive account all collapse here.
    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    #[error("Account not found")]
    NotFound,

    #[error("Authentication credentials were not provided")]
    NotAuthenticated,

    #[error("Token is invalid")]
    TokenInvalid,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has wrong type")]
    TokenWrongType,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Machine-readable reason reported in the `error` field of the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Password(e) => e.code(),
            AppError::Validation(_) => "validation_error",
            AppError::DuplicateAccount => "duplicate_account",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::NotFound => "not_found",
            AppError::NotAuthenticated => "not_authenticated",
            AppError::TokenInvalid => "token_invalid",
            AppError::TokenExpired => "token_expired",
            AppError::TokenWrongType => "token_wrong_type",
            AppError::TokenRevoked => "token_revoked",
            AppError::Redis(_) => "service_unavailable",
            AppError::Db(_) | AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Password(_) | AppError::Validation(_) | AppError::DuplicateAccount => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials
            | AppError::NotAuthenticated
            | AppError::TokenInvalid
            | AppError::TokenExpired
            | AppError::TokenWrongType
            | AppError::TokenRevoked => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Redis(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            // Storage and internal failures keep their cause out of the body.
            error!(error = %self, "request failed");
            status.canonical_reason().unwrap_or("Internal Server Error").to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "error": self.code(), "detail": detail }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_4xx() {
        assert_eq!(AppError::DuplicateAccount.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TokenWrongType.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Password(PasswordError::TooShort).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn token_failures_have_distinct_codes() {
        let codes = [
            AppError::TokenInvalid.code(),
            AppError::TokenExpired.code(),
            AppError::TokenWrongType.code(),
            AppError::TokenRevoked.code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[tokio::test]
    async fn json_rejection_is_a_400_validation_error() {
        use axum::{body::Body, extract::FromRequest, http::Request};

        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"password":"short1"}"#))
            .unwrap();
        let rejection = axum::Json::<std::collections::HashMap<String, u32>>::from_request(req, &())
            .await
            .unwrap_err();
        let err = AppError::from(rejection);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "validation_error");
    }

    #[tokio::test]
    async fn internal_errors_hide_detail() {
        let res = AppError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "internal_error");
        assert!(!json["detail"].as_str().unwrap().contains("10.0.0.3"));
    }
}
