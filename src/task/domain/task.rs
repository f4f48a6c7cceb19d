//! Task aggregate root and related task lifecycle types.

use super::{
    ParseTaskPriorityError, ParseTaskStateError, TaskDomainError, TaskId, TaskTitle, TaskVersion,
};
use crate::tenancy::{TenantId, UserId, WorkspaceId, WorkspaceScope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Task lifecycle state.
///
/// The declaration order is the canonical wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// No state was recorded.
    Unspecified,
    /// Task has been created but work has not started.
    New,
    /// Task is being worked on.
    InProgress,
    /// Task has been completed.
    Done,
    /// Task has been abandoned.
    Cancelled,
}

impl TaskState {
    /// Every state in canonical order.
    pub const ALL: [Self; 5] = [
        Self::Unspecified,
        Self::New,
        Self::InProgress,
        Self::Done,
        Self::Cancelled,
    ];

    /// Returns the canonical storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::New => "NEW",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns `true` when a task in this state accepts an assignee.
    #[must_use]
    pub const fn accepts_assignment(self) -> bool {
        matches!(self, Self::New | Self::InProgress)
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| ParseTaskStateError(value.to_owned()))
    }
}

/// Task priority.
///
/// The declaration order is the canonical wire order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    /// No priority was recorded.
    Unspecified,
    /// Low priority.
    Low,
    /// Medium priority, applied when the caller supplies none.
    #[default]
    Medium,
    /// High priority.
    High,
}

impl TaskPriority {
    /// Every priority in canonical order.
    pub const ALL: [Self; 4] = [Self::Unspecified, Self::Low, Self::Medium, Self::High];

    /// Returns the canonical storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == normalized)
            .ok_or_else(|| ParseTaskPriorityError(value.to_owned()))
    }
}

/// Fields supplied when inserting a task.
///
/// The store assigns the identifier, version and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    /// Owning tenant and workspace.
    pub scope: WorkspaceScope,
    /// Validated title.
    pub title: TaskTitle,
    /// Requested priority.
    pub priority: TaskPriority,
    /// Initial lifecycle state.
    pub state: TaskState,
}

impl NewTask {
    /// Creates an insert request in the [`TaskState::New`] state.
    #[must_use]
    pub const fn new(scope: WorkspaceScope, title: TaskTitle, priority: TaskPriority) -> Self {
        Self {
            scope,
            title,
            priority,
            state: TaskState::New,
        }
    }

    /// Overrides the initial state.
    #[must_use]
    pub const fn with_state(mut self, state: TaskState) -> Self {
        self.state = state;
        self
    }
}

/// Task aggregate root.
///
/// Serialises to the snake_case snapshot format used by outbox events,
/// idempotent replays and HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    tenant_id: TenantId,
    workspace_id: WorkspaceId,
    title: TaskTitle,
    priority: TaskPriority,
    state: TaskState,
    assignee_id: Option<UserId>,
    version: TaskVersion,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted tenant and workspace.
    pub scope: WorkspaceScope,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted lifecycle state.
    pub state: TaskState,
    /// Persisted assignee, if any.
    pub assignee_id: Option<UserId>,
    /// Persisted version.
    pub version: TaskVersion,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        let PersistedTaskData {
            id,
            scope,
            title,
            priority,
            state,
            assignee_id,
            version,
            created_at,
            updated_at,
        } = data;
        let (tenant_id, workspace_id) = scope.into_parts();
        Self {
            id,
            tenant_id,
            workspace_id,
            title,
            priority,
            state,
            assignee_id,
            version,
            created_at,
            updated_at,
        }
    }

    /// Reconstructs a task from a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the snapshot does not describe a
    /// valid task.
    pub fn from_snapshot(snapshot: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(snapshot)
    }

    /// Captures the full task state as a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialisation fails.
    pub fn to_snapshot(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the tenant and workspace that own this task.
    #[must_use]
    pub fn scope(&self) -> WorkspaceScope {
        WorkspaceScope::new(self.tenant_id.clone(), self.workspace_id.clone())
    }

    /// Returns the owning tenant.
    #[must_use]
    pub const fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Returns the owning workspace.
    #[must_use]
    pub const fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee_id(&self) -> Option<&UserId> {
        self.assignee_id.as_ref()
    }

    /// Returns the optimistic-concurrency version.
    #[must_use]
    pub const fn version(&self) -> TaskVersion {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies an assignment, bumping the version by one.
    ///
    /// State legality is checked by the workflow before the store is asked
    /// to persist the change; this method only records it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::VersionOverflow`] if the version cannot be
    /// incremented.
    pub fn record_assignment(
        &mut self,
        assignee_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), TaskDomainError> {
        self.version = self.version.next()?;
        self.assignee_id = Some(assignee_id);
        self.updated_at = at;
        Ok(())
    }
}
