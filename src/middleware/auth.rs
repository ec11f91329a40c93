//! Bearer-token extractor: the authenticated account id, passed explicitly to handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::http::AppState;

/// Extractor: account id from a valid, unrevoked access token (`Authorization: Bearer ...`).
#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub Uuid);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    debug!(error = %e, "rejected request: missing or malformed Authorization header");
                    AppError::NotAuthenticated
                })?;
        let account_id = state.tokens().authorize(bearer.token()).await?;
        Ok(AuthUser(account_id))
    }
}
