//! Store implementations over a staged copy of the tables.

use crate::idempotency::domain::{
    IdempotencyAction, IdempotencyKey, IdempotencyRecord, IdempotencyRecordId,
    NewIdempotencyRecord,
};
use crate::idempotency::ports::{
    IdempotencyStore, IdempotencyStoreError, IdempotencyStoreResult,
};
use crate::task::domain::{
    NewTask, NewTaskEvent, PersistedTaskData, Task, TaskEvent, TaskEventId, TaskId, TaskVersion,
};
use crate::task::ports::{
    TaskAssignment, TaskEventStore, TaskStore, TaskStoreError, TaskStoreResult,
};
use crate::tenancy::WorkspaceScope;
use mockable::Clock;
use std::collections::HashMap;

type IdempotencyUniqueKey = (WorkspaceScope, IdempotencyAction, IdempotencyKey);

/// Row storage mirroring the SQL tables. Keys carry the scope, so a lookup
/// under the wrong tenant or workspace misses.
#[derive(Debug, Clone, Default)]
pub(super) struct Tables {
    pub(super) tasks: HashMap<(WorkspaceScope, TaskId), Task>,
    pub(super) events: Vec<TaskEvent>,
    pub(super) idempotency: HashMap<IdempotencyUniqueKey, IdempotencyRecord>,
}

/// Store handle over one staged copy of the tables.
pub(super) struct InMemoryUnitOfWork<'a, C> {
    tables: Tables,
    clock: &'a C,
}

impl<'a, C: Clock> InMemoryUnitOfWork<'a, C> {
    pub(super) const fn new(tables: Tables, clock: &'a C) -> Self {
        Self { tables, clock }
    }

    pub(super) fn into_tables(self) -> Tables {
        self.tables
    }
}

impl<C: Clock> TaskStore for InMemoryUnitOfWork<'_, C> {
    fn insert_task(&mut self, task: &NewTask) -> TaskStoreResult<Task> {
        let now = self.clock.utc();
        let inserted = Task::from_persisted(PersistedTaskData {
            id: TaskId::new(),
            scope: task.scope.clone(),
            title: task.title.clone(),
            priority: task.priority,
            state: task.state,
            assignee_id: None,
            version: TaskVersion::INITIAL,
            created_at: now,
            updated_at: now,
        });
        self.tables
            .tasks
            .insert((task.scope.clone(), inserted.id()), inserted.clone());
        Ok(inserted)
    }

    fn find_task(&mut self, id: TaskId, scope: &WorkspaceScope) -> TaskStoreResult<Option<Task>> {
        Ok(self.tables.tasks.get(&(scope.clone(), id)).cloned())
    }

    fn assign_task(&mut self, assignment: &TaskAssignment) -> TaskStoreResult<Task> {
        let now = self.clock.utc();
        let row = self
            .tables
            .tasks
            .get_mut(&(assignment.scope.clone(), assignment.task_id))
            .filter(|task| task.version() == assignment.expected_version)
            .ok_or(TaskStoreError::VersionMismatchOrMissing {
                task_id: assignment.task_id,
                expected_version: assignment.expected_version,
            })?;
        row.record_assignment(assignment.assignee_id.clone(), now)
            .map_err(TaskStoreError::persistence)?;
        Ok(row.clone())
    }
}

impl<C: Clock> TaskEventStore for InMemoryUnitOfWork<'_, C> {
    fn append_event(&mut self, event: &NewTaskEvent) -> TaskStoreResult<TaskEvent> {
        let appended = TaskEvent::from_new(event.clone(), TaskEventId::new(), self.clock.utc());
        self.tables.events.push(appended.clone());
        Ok(appended)
    }
}

impl<C: Clock> IdempotencyStore for InMemoryUnitOfWork<'_, C> {
    fn find_idempotency_record(
        &mut self,
        scope: &WorkspaceScope,
        action: IdempotencyAction,
        key: &IdempotencyKey,
    ) -> IdempotencyStoreResult<Option<IdempotencyRecord>> {
        Ok(self
            .tables
            .idempotency
            .get(&(scope.clone(), action, key.clone()))
            .cloned())
    }

    fn insert_idempotency_record(
        &mut self,
        record: &NewIdempotencyRecord,
    ) -> IdempotencyStoreResult<IdempotencyRecord> {
        let unique_key = (record.scope.clone(), record.action, record.key.clone());
        if self.tables.idempotency.contains_key(&unique_key) {
            return Err(IdempotencyStoreError::DuplicateKey {
                action: record.action,
                key: record.key.clone(),
            });
        }
        let inserted = IdempotencyRecord::from_new(
            record.clone(),
            IdempotencyRecordId::new(),
            self.clock.utc(),
        );
        self.tables.idempotency.insert(unique_key, inserted.clone());
        Ok(inserted)
    }
}
