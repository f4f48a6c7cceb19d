//! Unit tests for the idempotency module.
