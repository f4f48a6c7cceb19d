//! Error types for idempotency value construction and parsing.

use thiserror::Error;

/// Errors returned while constructing idempotency values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdempotencyDomainError {
    /// The key is empty after trimming.
    #[error("idempotency key must not be blank")]
    BlankKey,

    /// The key exceeds the maximum length.
    #[error("idempotency key has {actual} characters, exceeds limit of {max}")]
    KeyTooLong {
        /// The maximum allowed number of characters.
        max: usize,
        /// The actual number of characters.
        actual: usize,
    },
}

/// Error returned while parsing idempotency actions from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown idempotency action: {0}")]
pub struct ParseIdempotencyActionError(pub String);

/// Error returned while parsing reference types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown idempotency reference type: {0}")]
pub struct ParseReferenceTypeError(pub String);
