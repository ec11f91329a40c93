//! Storage ports and their in-memory and Redis implementations.
//! The PostgreSQL account store lives in [`crate::db`].

mod memory;
mod redis_repo;

pub use memory::{MemoryAccountStore, MemoryRevocationStore};
pub use redis_repo::RedisRevocationStore;

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Account, NewAccount};

/// Persistent collection of accounts keyed by unique email.
///
/// Implementations enforce email uniqueness themselves and report a collision
/// as [`crate::AppError::DuplicateAccount`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, account: NewAccount) -> AppResult<Account>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;
    /// Overwrite every mutable column of the account with `account.id`.
    async fn update(&self, account: &Account) -> AppResult<Account>;
}

/// Revoked token identifiers, each kept until the token would have expired anyway.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoke(&self, jti: &str, ttl: Duration) -> AppResult<()>;
    async fn is_revoked(&self, jti: &str) -> AppResult<bool>;
}
