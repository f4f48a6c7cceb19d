//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the maximum length.
    #[error("task title has {actual} characters, exceeds limit of {max}")]
    TitleTooLong {
        /// The maximum allowed number of characters.
        max: usize,
        /// The actual number of characters.
        actual: usize,
    },

    /// Incrementing the version would overflow.
    #[error("task version {0} cannot be incremented")]
    VersionOverflow(u32),
}

/// Error returned while parsing task states from persistence or the wire.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);

/// Error returned while parsing task event types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task event type: {0}")]
pub struct ParseTaskEventTypeError(pub String);
