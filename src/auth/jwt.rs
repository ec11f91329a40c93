//! JWT issue, refresh, verification and revocation.
//!
//! Tokens are HS256-signed and stateless. Each carries the account id as
//! `sub`, a `token_type` discriminator and a unique `jti`. The only server-side
//! state is the revocation list, keyed by `jti`.

use crate::error::{AppError, AppResult};
use crate::repositories::RevocationStore;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account id
    pub token_type: TokenType,
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn account_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::TokenInvalid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    revoked: Arc<dyn RevocationStore>,
}

impl TokenService {
    pub fn new(
        secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
        revoked: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
            revoked,
        }
    }

    /// Mint an access and a refresh token for `account_id`.
    pub fn issue_pair(&self, account_id: Uuid) -> AppResult<TokenPair> {
        let now = Utc::now();
        Ok(TokenPair {
            access: self.mint(account_id, TokenType::Access, now)?,
            refresh: self.mint(account_id, TokenType::Refresh, now)?,
        })
    }

    /// Exchange a refresh token for a new access token bound to the same subject.
    /// Callers that must check the account first use [`Self::refresh_subject`]
    /// and [`Self::issue_access`].
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<String> {
        let account_id = self.refresh_subject(refresh_token).await?;
        self.issue_access(account_id)
    }

    /// Account id of a live refresh token.
    pub async fn refresh_subject(&self, refresh_token: &str) -> AppResult<Uuid> {
        let claims = self.decode_live(refresh_token).await?;
        if claims.token_type != TokenType::Refresh {
            return Err(AppError::TokenWrongType);
        }
        claims.account_id()
    }

    pub fn issue_access(&self, account_id: Uuid) -> AppResult<String> {
        let access = self.mint(account_id, TokenType::Access, Utc::now())?;
        debug!(account_id = %account_id, "access token issued");
        Ok(access)
    }

    /// Check signature, expiry and revocation of a token of either type.
    pub async fn verify(&self, token: &str) -> AppResult<()> {
        self.decode_live(token).await.map(|_| ())
    }

    /// Resolve an access token to the account id it was issued for.
    pub async fn authorize(&self, access_token: &str) -> AppResult<Uuid> {
        let claims = self.decode_live(access_token).await?;
        if claims.token_type != TokenType::Access {
            return Err(AppError::TokenWrongType);
        }
        claims.account_id()
    }

    /// Revoke a refresh token until it would have expired.
    pub async fn revoke(&self, refresh_token: &str) -> AppResult<()> {
        let claims = self.decode_live(refresh_token).await?;
        if claims.token_type != TokenType::Refresh {
            return Err(AppError::TokenWrongType);
        }
        let remaining = (claims.exp - Utc::now().timestamp()).max(0) as u64;
        self.revoked
            .revoke(&claims.jti, std::time::Duration::from_secs(remaining))
            .await?;
        info!(sub = %claims.sub, jti = %claims.jti, "refresh token revoked");
        Ok(())
    }

    pub(crate) fn mint(
        &self,
        account_id: Uuid,
        token_type: TokenType,
        issued_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: account_id.to_string(),
            token_type,
            jti: Uuid::new_v4().simple().to_string(),
            exp: (issued_at + ttl).timestamp(),
            iat: issued_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("jwt encode: {}", e)))?;
        Ok(token)
    }

    fn decode(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::TokenInvalid,
            }
        })?;
        Ok(data.claims)
    }

    async fn decode_live(&self, token: &str) -> AppResult<Claims> {
        let claims = self.decode(token)?;
        if self.revoked.is_revoked(&claims.jti).await? {
            return Err(AppError::TokenRevoked);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryRevocationStore;

    const SECRET: &str = "test-jwt-secret-min-32-chars!!!!";

    fn service_with(secret: &str) -> TokenService {
        TokenService::new(
            secret,
            Duration::minutes(5),
            Duration::days(1),
            Arc::new(MemoryRevocationStore::new()),
        )
    }

    fn service() -> TokenService {
        service_with(SECRET)
    }

    #[tokio::test]
    async fn issued_pair_verifies_immediately() {
        let tokens = service();
        let pair = tokens.issue_pair(Uuid::new_v4()).unwrap();
        assert!(tokens.verify(&pair.access).await.is_ok());
        assert!(tokens.verify(&pair.refresh).await.is_ok());
        assert_ne!(pair.access, pair.refresh);
    }

    #[tokio::test]
    async fn authorize_returns_subject() {
        let tokens = service();
        let id = Uuid::new_v4();
        let pair = tokens.issue_pair(id).unwrap();
        assert_eq!(tokens.authorize(&pair.access).await.unwrap(), id);
    }

    #[tokio::test]
    async fn access_token_expires() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::minutes(10);
        let access = tokens.mint(Uuid::new_v4(), TokenType::Access, issued_at).unwrap();
        assert!(matches!(tokens.verify(&access).await, Err(AppError::TokenExpired)));
        assert!(matches!(tokens.authorize(&access).await, Err(AppError::TokenExpired)));
    }

    #[tokio::test]
    async fn expired_refresh_token_cannot_refresh() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::days(2);
        let refresh = tokens.mint(Uuid::new_v4(), TokenType::Refresh, issued_at).unwrap();
        assert!(matches!(tokens.refresh(&refresh).await, Err(AppError::TokenExpired)));
    }

    #[tokio::test]
    async fn refresh_mints_new_access_for_same_subject() {
        let tokens = service();
        let id = Uuid::new_v4();
        let pair = tokens.issue_pair(id).unwrap();
        let access = tokens.refresh(&pair.refresh).await.unwrap();
        assert_ne!(access, pair.access);
        assert_eq!(tokens.authorize(&access).await.unwrap(), id);
    }

    #[tokio::test]
    async fn refresh_subject_is_the_issuing_account() {
        let tokens = service();
        let id = Uuid::new_v4();
        let pair = tokens.issue_pair(id).unwrap();
        assert_eq!(tokens.refresh_subject(&pair.refresh).await.unwrap(), id);
        assert!(matches!(
            tokens.refresh_subject(&pair.access).await,
            Err(AppError::TokenWrongType)
        ));
    }

    #[tokio::test]
    async fn access_token_cannot_refresh() {
        let tokens = service();
        let pair = tokens.issue_pair(Uuid::new_v4()).unwrap();
        assert!(matches!(tokens.refresh(&pair.access).await, Err(AppError::TokenWrongType)));
    }

    #[tokio::test]
    async fn refresh_token_cannot_authorize() {
        let tokens = service();
        let pair = tokens.issue_pair(Uuid::new_v4()).unwrap();
        assert!(matches!(tokens.authorize(&pair.refresh).await, Err(AppError::TokenWrongType)));
    }

    #[tokio::test]
    async fn foreign_secret_is_invalid() {
        let pair = service_with("another-secret-also-32-chars-long!!")
            .issue_pair(Uuid::new_v4())
            .unwrap();
        assert!(matches!(service().verify(&pair.access).await, Err(AppError::TokenInvalid)));
    }

    #[tokio::test]
    async fn garbage_and_tampered_tokens_are_invalid() {
        let tokens = service();
        assert!(matches!(tokens.verify("not.a.jwt").await, Err(AppError::TokenInvalid)));
        assert!(matches!(tokens.verify("").await, Err(AppError::TokenInvalid)));

        let pair = tokens.issue_pair(Uuid::new_v4()).unwrap();
        let mut tampered = pair.access.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });
        assert!(matches!(tokens.verify(&tampered).await, Err(AppError::TokenInvalid)));
    }

    #[tokio::test]
    async fn revoked_refresh_token_is_rejected() {
        let tokens = service();
        let pair = tokens.issue_pair(Uuid::new_v4()).unwrap();
        tokens.revoke(&pair.refresh).await.unwrap();
        assert!(matches!(tokens.refresh(&pair.refresh).await, Err(AppError::TokenRevoked)));
        assert!(matches!(tokens.verify(&pair.refresh).await, Err(AppError::TokenRevoked)));
        // The access token from the same pair is independent.
        assert!(tokens.verify(&pair.access).await.is_ok());
    }

    #[tokio::test]
    async fn access_token_cannot_be_revoked_as_refresh() {
        let tokens = service();
        let pair = tokens.issue_pair(Uuid::new_v4()).unwrap();
        assert!(matches!(tokens.revoke(&pair.access).await, Err(AppError::TokenWrongType)));
    }
}
