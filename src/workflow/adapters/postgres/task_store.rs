//! Task and outbox store implementations over an open transaction.

use super::executor::PgUnitOfWork;
use super::models::{NewTaskRow, TaskRow};
use super::schema::tasks;
use crate::task::domain::{
    NewTask, PersistedTaskData, Task, TaskId, TaskPriority, TaskState, TaskTitle, TaskVersion,
};
use crate::task::ports::{TaskAssignment, TaskStore, TaskStoreError, TaskStoreResult};
use crate::tenancy::{UserId, WorkspaceScope};
use diesel::prelude::*;

impl TaskStore for PgUnitOfWork<'_> {
    fn insert_task(&mut self, task: &NewTask) -> TaskStoreResult<Task> {
        let row = NewTaskRow {
            tenant_id: task.scope.tenant_id().as_str(),
            workspace_id: task.scope.workspace_id().as_str(),
            title: task.title.as_str(),
            priority: task.priority.as_str(),
            state: task.state.as_str(),
        };
        let inserted = diesel::insert_into(tasks::table)
            .values(&row)
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(self.connection())
            .optional()
            .map_err(TaskStoreError::persistence)?;
        inserted.map_or(Err(TaskStoreError::MissingReturnedRow("tasks")), row_to_task)
    }

    fn find_task(&mut self, id: TaskId, scope: &WorkspaceScope) -> TaskStoreResult<Option<Task>> {
        let row = tasks::table
            .filter(tasks::id.eq(id.into_inner()))
            .filter(tasks::tenant_id.eq(scope.tenant_id().as_str()))
            .filter(tasks::workspace_id.eq(scope.workspace_id().as_str()))
            .select(TaskRow::as_select())
            .first::<TaskRow>(self.connection())
            .optional()
            .map_err(TaskStoreError::persistence)?;
        row.map(row_to_task).transpose()
    }

    fn assign_task(&mut self, assignment: &TaskAssignment) -> TaskStoreResult<Task> {
        let scope = &assignment.scope;
        let updated = diesel::update(
            tasks::table
                .filter(tasks::id.eq(assignment.task_id.into_inner()))
                .filter(tasks::tenant_id.eq(scope.tenant_id().as_str()))
                .filter(tasks::workspace_id.eq(scope.workspace_id().as_str()))
                .filter(tasks::version.eq(i64::from(assignment.expected_version.value()))),
        )
        .set((
            tasks::assignee_id.eq(assignment.assignee_id.as_str()),
            tasks::version.eq(tasks::version + 1),
            tasks::updated_at.eq(diesel::dsl::now),
        ))
        .returning(TaskRow::as_returning())
        .get_result::<TaskRow>(self.connection())
        .optional()
        .map_err(TaskStoreError::persistence)?;

        updated.map_or_else(
            || {
                Err(TaskStoreError::VersionMismatchOrMissing {
                    task_id: assignment.task_id,
                    expected_version: assignment.expected_version,
                })
            },
            row_to_task,
        )
    }
}

fn row_to_task(row: TaskRow) -> TaskStoreResult<Task> {
    let TaskRow {
        id,
        tenant_id,
        workspace_id,
        title: persisted_title,
        priority: persisted_priority,
        state: persisted_state,
        assignee_id: persisted_assignee,
        version: persisted_version,
        created_at,
        updated_at,
    } = row;

    let scope =
        WorkspaceScope::from_parts(tenant_id, workspace_id).map_err(TaskStoreError::persistence)?;
    let title = TaskTitle::new(persisted_title).map_err(TaskStoreError::persistence)?;
    let priority = TaskPriority::try_from(persisted_priority.as_str())
        .map_err(TaskStoreError::persistence)?;
    let state =
        TaskState::try_from(persisted_state.as_str()).map_err(TaskStoreError::persistence)?;
    let assignee_id = persisted_assignee
        .map(UserId::new)
        .transpose()
        .map_err(TaskStoreError::persistence)?;
    let version = u32::try_from(persisted_version)
        .map(TaskVersion::new)
        .map_err(TaskStoreError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        scope,
        title,
        priority,
        state,
        assignee_id,
        version,
        created_at,
        updated_at,
    }))
}
