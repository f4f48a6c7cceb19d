//! Task records and their outbox events.
//!
//! A task is owned by exactly one tenant and workspace, carries an
//! optimistic-concurrency version and gains an immutable event on every
//! mutation.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]

pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
