//! Business logic: account lifecycle.

pub mod account;

pub use account::AccountService;
