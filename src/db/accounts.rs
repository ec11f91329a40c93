//! PostgreSQL account store. Email uniqueness is enforced by the table's unique index.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Account, NewAccount};
use crate::repositories::AccountStore;

const ACCOUNT_COLUMNS: &str =
    "id, email, name, password_hash, is_active, is_staff, is_superuser, created_at";

#[derive(Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-index violation to `DuplicateAccount`, everything else stays a DB error.
fn map_unique(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateAccount,
        _ => AppError::Db(e),
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: NewAccount) -> AppResult<Account> {
        let account = account.into_account(Uuid::new_v4(), Utc::now());
        let row = sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO accounts ({ACCOUNT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.name)
        .bind(&account.password_hash)
        .bind(account.is_active)
        .bind(account.is_staff)
        .bind(account.is_superuser)
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, account: &Account) -> AppResult<Account> {
        let row = sqlx::query_as::<_, Account>(&format!(
            r#"
            UPDATE accounts
            SET email = $2, name = $3, password_hash = $4,
                is_active = $5, is_staff = $6, is_superuser = $7
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.name)
        .bind(&account.password_hash)
        .bind(account.is_active)
        .bind(account.is_staff)
        .bind(account.is_superuser)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique)?;
        row.ok_or(AppError::NotFound)
    }
}
