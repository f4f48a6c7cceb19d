//! Outbox append over an open transaction.

use super::executor::PgUnitOfWork;
use super::models::NewTaskEventRow;
use super::schema::task_events;
use crate::task::domain::{NewTaskEvent, TaskEvent, TaskEventId};
use crate::task::ports::{TaskEventStore, TaskStoreError, TaskStoreResult};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

impl TaskEventStore for PgUnitOfWork<'_> {
    fn append_event(&mut self, event: &NewTaskEvent) -> TaskStoreResult<TaskEvent> {
        let row = NewTaskEventRow {
            tenant_id: event.scope.tenant_id().as_str(),
            workspace_id: event.scope.workspace_id().as_str(),
            task_id: event.task_id.into_inner(),
            event_type: event.event_type.as_str(),
            snapshot: &event.snapshot,
        };
        let assigned = diesel::insert_into(task_events::table)
            .values(&row)
            .returning((task_events::id, task_events::created_at))
            .get_result::<(uuid::Uuid, DateTime<Utc>)>(self.connection())
            .optional()
            .map_err(TaskStoreError::persistence)?;

        let (id, created_at) = assigned.ok_or(TaskStoreError::MissingReturnedRow("task_events"))?;
        Ok(TaskEvent::from_new(
            event.clone(),
            TaskEventId::from_uuid(id),
            created_at,
        ))
    }
}
