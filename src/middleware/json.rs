//! JSON body extractor whose rejections are reported as `AppError`.

use axum::extract::FromRequest;

use crate::error::AppError;

/// Like `axum::Json`, but a malformed, incomplete or mistyped body becomes a
/// `400 validation_error` JSON response.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
