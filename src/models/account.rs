//! Account records and their outward representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored account. Never serialized directly; use [`AccountView`].
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new account. `email` is already normalized and `password_hash` already derived.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewAccount {
    pub fn into_account(self, id: Uuid, created_at: DateTime<Utc>) -> Account {
        Account {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            is_active: true,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            created_at,
        }
    }
}

/// Mutable profile fields. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Public representation of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub email: String,
    pub name: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            email: account.email.clone(),
            name: account.name.clone(),
        }
    }
}
