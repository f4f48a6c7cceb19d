//! Idempotency records for replaying the outcome of keyed writes.
//!
//! A record is written once per `(tenant, workspace, action, key)` inside the
//! same transaction as the write it describes and is read back on every later
//! request bearing that key.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]

pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
