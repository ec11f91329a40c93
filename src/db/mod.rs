//! Database layer: pool, schema and the PostgreSQL account store.

mod accounts;
mod pool;

pub use accounts::PgAccountStore;
pub use pool::{create_pool, ensure_schema, DbPool};
