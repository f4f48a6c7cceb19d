//! Transactional write pipeline for task creation and assignment.
//!
//! Each write runs as one unit of work that composes idempotency-key
//! deduplication, optimistic-version-checked mutation and outbox event
//! recording. Either all three commit or none do.
//!
//! - Unit-of-work contracts in [`ports`]
//! - In-memory and `PostgreSQL` executors in [`adapters`]
//! - Validation, the workflow engine and the request-facing service in
//!   [`services`]

pub mod adapters;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
