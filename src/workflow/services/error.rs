//! Error taxonomy for workflow operations.

use crate::idempotency::ports::IdempotencyStoreError;
use crate::task::domain::TaskVersion;
use crate::task::ports::TaskStoreError;
use crate::workflow::ports::TransactionError;
use thiserror::Error;

/// Service-level errors for task workflow operations.
///
/// The first four variants are expected outcomes the caller can act on.
/// Everything else is unexpected and surfaces as an internal failure.
#[derive(Debug, Error)]
pub enum TaskWorkflowError {
    /// Input is missing or malformed.
    #[error("{message}")]
    Validation {
        /// Offending input field.
        field: &'static str,
        /// Human-readable reason.
        message: String,
    },

    /// The caller's role does not permit the action.
    #[error("{0}")]
    Authorization(String),

    /// A referenced entity does not exist in the caller's scope.
    #[error("{message}")]
    NotFound {
        /// Kind of the missing entity.
        resource: &'static str,
        /// Human-readable reason.
        message: String,
    },

    /// The optimistic-version check failed.
    #[error("Task version mismatch: expected {expected_version}, actual {actual_version}")]
    Conflict {
        /// Version the caller supplied.
        expected_version: TaskVersion,
        /// Last version observed before the conditional update.
        actual_version: TaskVersion,
    },

    /// Task or outbox store failure.
    #[error(transparent)]
    TaskStore(#[from] TaskStoreError),

    /// Idempotency store failure.
    #[error(transparent)]
    IdempotencyStore(#[from] IdempotencyStoreError),

    /// Transaction could not be opened or committed.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Snapshot encoding or decoding failed.
    #[error("snapshot serialisation failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Result type for workflow operations.
pub type TaskWorkflowResult<T> = Result<T, TaskWorkflowError>;

/// Coarse classification of [`TaskWorkflowError`] for request adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowErrorKind {
    /// Malformed or missing input.
    Validation,
    /// Insufficient role.
    Authorization,
    /// Missing entity.
    NotFound,
    /// Optimistic-version mismatch.
    Conflict,
    /// Unexpected failure.
    Internal,
}

impl TaskWorkflowError {
    /// Creates a validation error for `field`.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    /// Creates a not-found error for the task identified by `task_id`.
    #[must_use]
    pub fn task_not_found(task_id: &str) -> Self {
        Self::NotFound {
            resource: "task",
            message: format!("Task {task_id} not found"),
        }
    }

    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> WorkflowErrorKind {
        match self {
            Self::Validation { .. } => WorkflowErrorKind::Validation,
            Self::Authorization(_) => WorkflowErrorKind::Authorization,
            Self::NotFound { .. } => WorkflowErrorKind::NotFound,
            Self::Conflict { .. } => WorkflowErrorKind::Conflict,
            Self::TaskStore(_)
            | Self::IdempotencyStore(_)
            | Self::Transaction(_)
            | Self::Snapshot(_) => WorkflowErrorKind::Internal,
        }
    }
}
