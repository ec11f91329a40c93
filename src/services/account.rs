//! Account registration, profile updates and password authentication.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{validate_password, Credentials};
use crate::error::{AppError, AppResult};
use crate::models::{Account, NewAccount, ProfileUpdate};
use crate::repositories::AccountStore;

const MAX_NAME_CHARS: usize = 255;

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Create a regular account. Duplicate emails surface as `DuplicateAccount`
    /// from the store's uniqueness constraint.
    pub async fn register(&self, email: &str, name: &str, password: &str) -> AppResult<Account> {
        self.create(email, name, password, false).await
    }

    /// Create an account with the staff and superuser flags set.
    pub async fn create_superuser(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> AppResult<Account> {
        self.create(email, name, password, true).await
    }

    async fn create(
        &self,
        email: &str,
        name: &str,
        password: &str,
        privileged: bool,
    ) -> AppResult<Account> {
        let email = Credentials::account_email(email)?;
        validate_name(name)?;
        let password = validate_password(password)?;

        let account = self
            .store
            .insert(NewAccount {
                email,
                name: name.to_string(),
                password_hash: Credentials::hash(password)?,
                is_staff: privileged,
                is_superuser: privileged,
            })
            .await?;
        info!(account_id = %account.id, superuser = privileged, "account created");
        Ok(account)
    }

    /// Apply the supplied profile fields. A new password is validated and re-hashed;
    /// the current password is not asked for.
    pub async fn update_profile(&self, account_id: Uuid, fields: ProfileUpdate) -> AppResult<Account> {
        let mut account = self.get(account_id).await?;

        if let Some(email) = fields.email {
            account.email = Credentials::account_email(&email)?;
        }
        if let Some(name) = fields.name {
            validate_name(&name)?;
            account.name = name;
        }
        if let Some(password) = fields.password {
            let password = validate_password(&password)?;
            account.password_hash = Credentials::hash(password)?;
        }

        let account = self.store.update(&account).await?;
        info!(account_id = %account.id, "profile updated");
        Ok(account)
    }

    /// Check an email/password pair. Unknown email, inactive account and wrong
    /// password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<Account> {
        let email = Credentials::normalize_email(email);
        let Some(account) = self.store.find_by_email(&email).await? else {
            Credentials::verify_dummy(password);
            warn!("login failed: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        let password_ok = Credentials::matches(password, &account.password_hash)?;
        if !password_ok || !account.is_active {
            warn!(account_id = %account.id, active = account.is_active, "login failed");
            return Err(AppError::InvalidCredentials);
        }
        Ok(account)
    }

    pub async fn get(&self, account_id: Uuid) -> AppResult<Account> {
        self.store
            .find_by_id(account_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Load the account behind an authenticated request; inactive accounts are refused.
    pub async fn get_active(&self, account_id: Uuid) -> AppResult<Account> {
        let account = self.get(account_id).await?;
        if !account.is_active {
            return Err(AppError::InvalidCredentials);
        }
        Ok(account)
    }

    pub async fn set_active(&self, account_id: Uuid, is_active: bool) -> AppResult<Account> {
        let mut account = self.get(account_id).await?;
        account.is_active = is_active;
        let account = self.store.update(&account).await?;
        info!(account_id = %account.id, is_active, "account activation changed");
        Ok(account)
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    let len = name.trim().chars().count();
    if len == 0 || name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::Validation(format!(
            "Name must be between 1 and {} characters",
            MAX_NAME_CHARS
        )));
    }
    Ok(())
}
