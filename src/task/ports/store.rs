//! Store ports for task rows and their outbox events.

use crate::task::domain::{NewTask, NewTaskEvent, Task, TaskEvent, TaskId, TaskVersion};
use crate::tenancy::{UserId, WorkspaceScope};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task and event store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Conditional assignment applied by [`TaskStore::assign_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAssignment {
    /// Task to update.
    pub task_id: TaskId,
    /// Scope the task must belong to.
    pub scope: WorkspaceScope,
    /// New assignee.
    pub assignee_id: UserId,
    /// Version the row must currently hold for the update to apply.
    pub expected_version: TaskVersion,
}

/// Task persistence contract with optimistic-locking semantics.
pub trait TaskStore {
    /// Inserts a task and returns it with store-assigned identifier,
    /// version and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::MissingReturnedRow`] when the insert yields
    /// no row, or [`TaskStoreError::Persistence`] on write failure.
    fn insert_task(&mut self, task: &NewTask) -> TaskStoreResult<Task>;

    /// Finds a task by identifier within `scope`.
    ///
    /// Returns `None` when no task with that identifier exists in the scope,
    /// including when it exists under another tenant or workspace.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lookup fails.
    fn find_task(&mut self, id: TaskId, scope: &WorkspaceScope) -> TaskStoreResult<Option<Task>>;

    /// Sets the assignee if the row still holds `expected_version`,
    /// incrementing the version in the same statement.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::VersionMismatchOrMissing`] when no row
    /// matched. A stale version and a missing row are not distinguished.
    fn assign_task(&mut self, assignment: &TaskAssignment) -> TaskStoreResult<Task>;
}

/// Append-only outbox contract.
pub trait TaskEventStore {
    /// Appends an event and returns it with store-assigned fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::MissingReturnedRow`] when the insert yields
    /// no row, or [`TaskStoreError::Persistence`] on write failure.
    fn append_event(&mut self, event: &NewTaskEvent) -> TaskStoreResult<TaskEvent>;
}

/// Errors returned by task and event store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// The conditional update affected no rows.
    #[error("task {task_id} not updated: version {expected_version} not current or task missing")]
    VersionMismatchOrMissing {
        /// Task the update targeted.
        task_id: TaskId,
        /// Version the update required.
        expected_version: TaskVersion,
    },

    /// An insert that must return a row returned none.
    #[error("insert into {0} returned no row")]
    MissingReturnedRow(&'static str),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
