//! Application services for the transactional task workflow.

mod engine;
mod error;
mod requests;
mod service;
mod validation;

pub use engine::{AssignTaskInput, TaskWorkflowEngine};
pub use error::{TaskWorkflowError, TaskWorkflowResult, WorkflowErrorKind};
pub use requests::{AssignTaskRequest, CreateTaskRequest};
pub use service::{AssignTaskOutput, CreateTaskOutput, TaskService};
pub use validation::{ValidatedAssign, ValidatedCreate, validate_assign, validate_create};
