//! Port contracts for idempotency persistence.

pub mod store;

pub use store::{IdempotencyStore, IdempotencyStoreError, IdempotencyStoreResult};
