//! Password strength rules applied on registration and password change.
//!
//! Rules run in a fixed order (length, whitespace, letter/digit mix) and the
//! first failing rule is reported.

use thiserror::Error;

/// Passwords must be strictly longer than this many characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordError {
    #[error("Password must be longer than {} characters", MIN_PASSWORD_CHARS)]
    TooShort,
    #[error("Password must not contain whitespace")]
    ContainsWhitespace,
    #[error("Password must contain one letter character and one number character")]
    NotAlphanumeric,
}

impl PasswordError {
    pub fn code(&self) -> &'static str {
        match self {
            PasswordError::TooShort => "password_too_short",
            PasswordError::ContainsWhitespace => "password_has_whitespace",
            PasswordError::NotAlphanumeric => "password_not_alphanumeric",
        }
    }
}

/// Check `password` against the rules and hand it back unchanged on success.
pub fn validate_password(password: &str) -> Result<&str, PasswordError> {
    if password.chars().count() <= MIN_PASSWORD_CHARS {
        return Err(PasswordError::TooShort);
    }
    if password.chars().any(char::is_whitespace) {
        return Err(PasswordError::ContainsWhitespace);
    }
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    if !(has_digit && has_letter) {
        return Err(PasswordError::NotAlphanumeric);
    }
    Ok(password)
}
