//! Raw request payloads accepted by [`super::TaskService`].
//!
//! Fields hold caller input as received; nothing is validated until the
//! request reaches [`super::validate_create`] or [`super::validate_assign`].

use crate::tenancy::UserRole;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub(super) tenant_id: String,
    pub(super) workspace_id: String,
    pub(super) title: String,
    pub(super) priority: Option<String>,
    pub(super) idempotency_key: Option<String>,
    pub(super) role: UserRole,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        tenant_id: impl Into<String>,
        workspace_id: impl Into<String>,
        title: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            workspace_id: workspace_id.into(),
            title: title.into(),
            priority: None,
            idempotency_key: None,
            role,
        }
    }

    /// Sets the priority name.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets the idempotency key.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Request payload for assigning a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignTaskRequest {
    pub(super) tenant_id: String,
    pub(super) workspace_id: String,
    pub(super) task_id: String,
    pub(super) assignee_id: String,
    pub(super) expected_version: Option<u32>,
    pub(super) idempotency_key: Option<String>,
    pub(super) role: UserRole,
}

impl AssignTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        tenant_id: impl Into<String>,
        workspace_id: impl Into<String>,
        task_id: impl Into<String>,
        assignee_id: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            workspace_id: workspace_id.into(),
            task_id: task_id.into(),
            assignee_id: assignee_id.into(),
            expected_version: None,
            idempotency_key: None,
            role,
        }
    }

    /// Sets the version the caller last observed.
    #[must_use]
    pub const fn with_expected_version(mut self, version: u32) -> Self {
        self.expected_version = Some(version);
        self
    }

    /// Sets the idempotency key.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}
