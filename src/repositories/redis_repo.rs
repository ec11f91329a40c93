//! Redis-backed token revocation list.

use async_trait::async_trait;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::RevocationStore;
use crate::error::{AppError, AppResult};

const REVOKED_PREFIX: &str = "accounts:revoked:";

fn revoked_key(jti: &str) -> String {
    format!("{}{}", REVOKED_PREFIX, jti)
}

/// Stores one key per revoked `jti`, expiring together with the token.
#[derive(Clone)]
pub struct RedisRevocationStore {
    client: Arc<redis::Client>,
}

impl RedisRevocationStore {
    /// Create store from Redis URL.
    pub fn new(redis_url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, jti: &str, ttl: Duration) -> AppResult<()> {
        // Round up so the entry never expires before the token does. EX 0 is rejected.
        let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
        if secs == 0 {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(revoked_key(jti))
            .arg(1)
            .arg("EX")
            .arg(secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!(jti = %jti, ttl_secs = secs, "token revoked");
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> AppResult<bool> {
        let mut conn = self.connection().await?;
        let exists: bool = conn.exists(revoked_key(jti)).await?;
        Ok(exists)
    }
}
