//! `PostgreSQL` transaction executor and store implementations.

mod blocking;
mod event_store;
mod executor;
mod idempotency_store;
mod models;
mod schema;
mod task_store;

pub use blocking::{PgPool, build_pool};
pub use executor::PostgresTransactionExecutor;
pub use schema::{SCHEMA_SQL, apply_schema};
