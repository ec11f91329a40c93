//! Request extractors shared by HTTP handlers.

pub mod auth;
pub mod json;

pub use auth::AuthUser;
pub use json::AppJson;
