//! In-process stores backed by `HashMap`s, for tests and single-node runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, RevocationStore};
use crate::error::{AppError, AppResult};
use crate::models::{Account, NewAccount};

#[derive(Default, Clone)]
pub struct MemoryAccountStore {
    // Keyed by id; email uniqueness is checked under the same write lock as the insert.
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: NewAccount) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(AppError::DuplicateAccount);
        }
        let account = account.into_account(Uuid::new_v4(), Utc::now());
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn update(&self, account: &Account) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.id != account.id && a.email == account.email)
        {
            return Err(AppError::DuplicateAccount);
        }
        let stored = accounts.get_mut(&account.id).ok_or(AppError::NotFound)?;
        *stored = Account {
            id: stored.id,
            created_at: stored.created_at,
            ..account.clone()
        };
        Ok(stored.clone())
    }
}

#[derive(Default, Clone)]
pub struct MemoryRevocationStore {
    revoked: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, jti: &str, ttl: Duration) -> AppResult<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("revocation ttl: {}", e)))?;
        let now = Utc::now();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, until| *until > now);
        revoked.insert(jti.to_string(), now + ttl);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> AppResult<bool> {
        let revoked = self.revoked.read().await;
        Ok(revoked.get(jti).is_some_and(|until| *until > Utc::now()))
    }
}
