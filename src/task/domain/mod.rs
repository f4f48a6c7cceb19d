//! Domain model for multi-tenant task management.
//!
//! Tasks, their validated scalars and the outbox events recorded for each
//! mutation. Infrastructure concerns stay outside this boundary.

mod error;
mod event;
mod ids;
mod task;

pub use error::{
    ParseTaskEventTypeError, ParseTaskPriorityError, ParseTaskStateError, TaskDomainError,
};
pub use event::{NewTaskEvent, TaskEvent, TaskEventType};
pub use ids::{TaskEventId, TaskId, TaskTitle, TaskVersion};
pub use task::{NewTask, PersistedTaskData, Task, TaskPriority, TaskState};
