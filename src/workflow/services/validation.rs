//! Input validation run before any transaction opens.
//!
//! Checks run in a fixed order and stop at the first failure, so callers
//! always see the same field reported for the same input.

use super::engine::AssignTaskInput;
use super::error::{TaskWorkflowError, TaskWorkflowResult};
use super::requests::{AssignTaskRequest, CreateTaskRequest};
use crate::idempotency::domain::IdempotencyKey;
use crate::task::domain::{NewTask, TaskDomainError, TaskPriority, TaskTitle, TaskVersion};
use crate::tenancy::{TenantId, UserId, WorkspaceId, WorkspaceScope};

/// Create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCreate {
    /// Task to insert.
    pub new_task: NewTask,
    /// Deduplication key, if the caller supplied a non-blank one.
    pub idempotency_key: Option<IdempotencyKey>,
}

/// Assign request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAssign {
    /// Assignment to apply.
    pub input: AssignTaskInput,
    /// Deduplication key, if the caller supplied a non-blank one.
    pub idempotency_key: Option<IdempotencyKey>,
}

/// Validates a create request.
///
/// Order: tenant, workspace, title, priority, role, idempotency key. An
/// absent priority defaults to [`TaskPriority::Medium`].
///
/// # Errors
///
/// Returns [`TaskWorkflowError::Validation`] naming the first invalid field.
pub fn validate_create(request: CreateTaskRequest) -> TaskWorkflowResult<ValidatedCreate> {
    let CreateTaskRequest {
        tenant_id,
        workspace_id,
        title,
        priority,
        idempotency_key,
        role,
    } = request;

    let scope = validate_scope(tenant_id, workspace_id)?;
    let validated_title = TaskTitle::new(title).map_err(|err| match err {
        TaskDomainError::TitleTooLong { max, .. } => {
            TaskWorkflowError::validation("title", format!("title must be {max} characters or less"))
        }
        _ => TaskWorkflowError::validation("title", "title is required"),
    })?;
    let validated_priority = priority
        .as_deref()
        .map(TaskPriority::try_from)
        .transpose()
        .map_err(|_| TaskWorkflowError::validation("priority", "invalid priority value"))?
        .unwrap_or_default();
    if !role.is_specified() {
        return Err(TaskWorkflowError::validation(
            "role",
            "role is required (Agent or Manager)",
        ));
    }

    Ok(ValidatedCreate {
        new_task: NewTask::new(scope, validated_title, validated_priority),
        idempotency_key: validate_idempotency_key(idempotency_key)?,
    })
}

/// Validates an assign request.
///
/// The role check runs first so that callers without permission learn
/// nothing about the rest of their input. Then: tenant, workspace, task
/// identifier, assignee, expected version, idempotency key.
///
/// # Errors
///
/// Returns [`TaskWorkflowError::Authorization`] for non-manager callers and
/// [`TaskWorkflowError::Validation`] naming the first invalid field.
pub fn validate_assign(request: AssignTaskRequest) -> TaskWorkflowResult<ValidatedAssign> {
    let AssignTaskRequest {
        tenant_id,
        workspace_id,
        task_id,
        assignee_id,
        expected_version,
        idempotency_key,
        role,
    } = request;

    if !role.can_assign_tasks() {
        return Err(TaskWorkflowError::authorization(
            "Only managers can assign tasks",
        ));
    }
    let scope = validate_scope(tenant_id, workspace_id)?;
    if task_id.trim().is_empty() {
        return Err(TaskWorkflowError::validation("taskId", "taskId is required"));
    }
    let assignee = UserId::new(assignee_id)
        .map_err(|_| TaskWorkflowError::validation("assignee_id", "assignee_id is required"))?;
    let version = expected_version.map(TaskVersion::new).ok_or_else(|| {
        TaskWorkflowError::validation("expectedVersion", "expectedVersion is required")
    })?;

    Ok(ValidatedAssign {
        input: AssignTaskInput {
            task_id,
            scope,
            assignee_id: assignee,
            expected_version: version,
        },
        idempotency_key: validate_idempotency_key(idempotency_key)?,
    })
}

fn validate_scope(tenant_id: String, workspace_id: String) -> TaskWorkflowResult<WorkspaceScope> {
    let tenant = TenantId::new(tenant_id)
        .map_err(|_| TaskWorkflowError::validation("tenantId", "tenantId is required"))?;
    let workspace = WorkspaceId::new(workspace_id)
        .map_err(|_| TaskWorkflowError::validation("workspaceId", "workspaceId is required"))?;
    Ok(WorkspaceScope::new(tenant, workspace))
}

/// Blank keys count as absent.
fn validate_idempotency_key(raw: Option<String>) -> TaskWorkflowResult<Option<IdempotencyKey>> {
    raw.filter(|value| !value.trim().is_empty())
        .map(IdempotencyKey::new)
        .transpose()
        .map_err(|_| {
            TaskWorkflowError::validation(
                "idempotencyKey",
                format!(
                    "idempotencyKey must be {} characters or less",
                    IdempotencyKey::MAX_CHARS
                ),
            )
        })
}
