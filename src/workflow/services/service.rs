//! Request-facing service: validate, then run the workflow.

use super::engine::TaskWorkflowEngine;
use super::error::TaskWorkflowResult;
use super::requests::{AssignTaskRequest, CreateTaskRequest};
use super::validation::{validate_assign, validate_create};
use crate::task::domain::Task;
use crate::workflow::ports::TransactionExecutor;
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTaskOutput {
    /// Created or replayed task.
    pub task: Task,
}

/// Result of a successful assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignTaskOutput {
    /// Updated or replayed task.
    pub task: Task,
}

/// Task service validating raw requests before handing them to the
/// workflow engine.
pub struct TaskService<X, C>
where
    X: TransactionExecutor,
    C: Clock + Send + Sync,
{
    engine: TaskWorkflowEngine<X, C>,
}

impl<X, C> Clone for TaskService<X, C>
where
    X: TransactionExecutor,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<X, C> TaskService<X, C>
where
    X: TransactionExecutor,
    C: Clock + Send + Sync,
{
    /// Creates a service over `executor`.
    #[must_use]
    pub const fn new(executor: Arc<X>, clock: Arc<C>) -> Self {
        Self {
            engine: TaskWorkflowEngine::new(executor, clock),
        }
    }

    /// Validates and creates a task. New tasks start in state `NEW` with
    /// priority `MEDIUM` unless the request names one.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskWorkflowError::Validation`] before any
    /// transaction opens when the request is invalid, or any engine error.
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
    ) -> TaskWorkflowResult<CreateTaskOutput> {
        let validated = validate_create(request)?;
        let task = self
            .engine
            .create(validated.new_task, validated.idempotency_key)
            .await?;
        Ok(CreateTaskOutput { task })
    }

    /// Validates and applies an assignment.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskWorkflowError::Authorization`] for non-manager
    /// callers, [`super::TaskWorkflowError::Validation`] for invalid input,
    /// or any engine error.
    pub async fn assign_task(
        &self,
        request: AssignTaskRequest,
    ) -> TaskWorkflowResult<AssignTaskOutput> {
        let validated = validate_assign(request)?;
        let task = self
            .engine
            .assign(validated.input, validated.idempotency_key)
            .await?;
        Ok(AssignTaskOutput { task })
    }
}
