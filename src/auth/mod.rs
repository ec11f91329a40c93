//! Authentication: password rules, credential hashing, JWT tokens and their endpoints.

mod credentials;
mod handlers;
mod jwt;
mod policy;

pub use credentials::Credentials;
pub use handlers::{obtain_token, refresh_token, register, revoke_token, verify_token};
pub use jwt::{Claims, TokenPair, TokenService, TokenType};
pub use policy::{validate_password, PasswordError, MIN_PASSWORD_CHARS};
