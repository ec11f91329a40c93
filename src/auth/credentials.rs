//! Account credentials: argon2 password hashes and canonical email addresses.

use std::sync::OnceLock;

use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::ValidateEmail;

/// Shared argon2 instance with the crate's default parameters.
fn argon2() -> &'static Argon2<'static> {
    static ARGON2: OnceLock<Argon2<'static>> = OnceLock::new();
    ARGON2.get_or_init(Argon2::default)
}

pub struct Credentials;

impl Credentials {
    /// Derive the stored PHC string for a new account password. Each call draws a fresh salt.
    pub fn hash(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|phc| phc.to_string())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("cannot hash account password: {}", e)))
    }

    /// Whether `password` is the one behind `stored`. A stored value that is not
    /// a PHC string is a corrupt account row, not a wrong password.
    pub fn matches(password: &str, stored: &str) -> AppResult<bool> {
        let stored = PasswordHash::new(stored).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("stored password hash is corrupt: {}", e))
        })?;
        Ok(argon2().verify_password(password.as_bytes(), &stored).is_ok())
    }

    /// Burn one verification against a fixed hash so a lookup miss costs the
    /// same as a wrong password.
    pub fn verify_dummy(password: &str) {
        static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
        let hash = DUMMY_HASH.get_or_init(|| Self::hash("dummy-password-0").ok());
        if let Some(hash) = hash {
            let _ = Self::matches(password, hash);
        }
    }

    /// Trim and lower-case the whole address.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Canonical form of an account email, or a validation error if it is not an address.
    pub fn account_email(raw: &str) -> AppResult<String> {
        let email = Self::normalize_email(raw);
        if email.is_empty() {
            return Err(AppError::Validation("Email is required".to_string()));
        }
        if !email.validate_email() {
            return Err(AppError::Validation("Enter a valid email address".to_string()));
        }
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_hash_matches_only_its_password() {
        let stored = Credentials::hash("testpass123").unwrap();
        assert!(Credentials::matches("testpass123", &stored).unwrap());
        assert!(!Credentials::matches("testpass124", &stored).unwrap());
        assert!(!Credentials::matches("", &stored).unwrap());
    }

    #[test]
    fn same_password_hashes_differently_per_account() {
        let first = Credentials::hash("testpass123").unwrap();
        let second = Credentials::hash("testpass123").unwrap();
        assert_ne!(first, second);
        assert!(!first.contains("testpass123"));
        assert!(first.starts_with("$argon2"));
    }

    #[test]
    fn corrupt_stored_hash_is_an_internal_error() {
        let err = Credentials::matches("testpass123", "plaintext-leftover").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn account_email_is_canonical() {
        assert_eq!(
            Credentials::account_email("  John.Doe@Email.COM ").unwrap(),
            "john.doe@email.com"
        );
    }

    #[test]
    fn account_email_rejects_non_addresses() {
        for raw in ["", "   ", "john", "@email.com", "john@"] {
            assert!(
                matches!(Credentials::account_email(raw), Err(AppError::Validation(_))),
                "{raw:?}"
            );
        }
    }
}
