//! Outbox event records appended alongside every task mutation.

use super::{ParseTaskEventTypeError, Task, TaskEventId, TaskId};
use crate::tenancy::WorkspaceScope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of state change an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskEventType {
    /// A task was created.
    TaskCreated,
    /// A task received a new assignee.
    TaskAssigned,
}

impl TaskEventType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "TASK_CREATED",
            Self::TaskAssigned => "TASK_ASSIGNED",
        }
    }
}

impl TryFrom<&str> for TaskEventType {
    type Error = ParseTaskEventTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "TASK_CREATED" => Ok(Self::TaskCreated),
            "TASK_ASSIGNED" => Ok(Self::TaskAssigned),
            _ => Err(ParseTaskEventTypeError(value.to_owned())),
        }
    }
}

/// Event payload handed to the event store for appending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskEvent {
    /// Owning tenant and workspace.
    pub scope: WorkspaceScope,
    /// Task the event describes.
    pub task_id: TaskId,
    /// Kind of change.
    pub event_type: TaskEventType,
    /// Full task state at the moment of the event.
    pub snapshot: Value,
}

impl NewTaskEvent {
    /// Builds an event carrying a snapshot of `task`.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the snapshot cannot be produced.
    pub fn for_task(task: &Task, event_type: TaskEventType) -> Result<Self, serde_json::Error> {
        Ok(Self {
            scope: task.scope(),
            task_id: task.id(),
            event_type,
            snapshot: task.to_snapshot()?,
        })
    }
}

/// Immutable, append-only fact about a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEvent {
    /// Store-assigned identifier.
    pub id: TaskEventId,
    /// Owning tenant and workspace.
    pub scope: WorkspaceScope,
    /// Task the event describes.
    pub task_id: TaskId,
    /// Kind of change.
    pub event_type: TaskEventType,
    /// Full task state at the moment of the event.
    pub snapshot: Value,
    /// Store-assigned append timestamp.
    pub created_at: DateTime<Utc>,
}

impl TaskEvent {
    /// Completes an appended event with its store-assigned fields.
    #[must_use]
    pub fn from_new(event: NewTaskEvent, id: TaskEventId, created_at: DateTime<Utc>) -> Self {
        let NewTaskEvent {
            scope,
            task_id,
            event_type,
            snapshot,
        } = event;
        Self {
            id,
            scope,
            task_id,
            event_type,
            snapshot,
            created_at,
        }
    }
}
