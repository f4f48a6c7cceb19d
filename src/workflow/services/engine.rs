//! Transactional orchestration of task writes.
//!
//! Every write follows the same shape inside one unit of work:
//!
//! 1. replay the recorded outcome if the idempotency key was seen before;
//! 2. apply the mutation;
//! 3. append the outbox event;
//! 4. record the outcome under the idempotency key.
//!
//! When two requests with the same key race, the loser's whole transaction
//! rolls back and the engine replays the winner's record from a fresh
//! transaction. The loser notices either through the uniqueness rule on the
//! key in step 4, or, for assignments, through the version check in step 2
//! once the winner has bumped the version.

use super::error::{TaskWorkflowError, TaskWorkflowResult};
use crate::idempotency::domain::{
    IdempotencyAction, IdempotencyKey, NewIdempotencyRecord, RequestFingerprint,
};
use crate::idempotency::ports::IdempotencyStoreError;
use crate::task::domain::{NewTask, NewTaskEvent, Task, TaskEventType, TaskId, TaskVersion};
use crate::task::ports::{TaskAssignment, TaskStoreError};
use crate::tenancy::{UserId, WorkspaceScope};
use crate::workflow::ports::{TransactionExecutor, UnitOfWork};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Validated assignment handed to [`TaskWorkflowEngine::assign`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignTaskInput {
    /// Caller-supplied task identifier. One that does not parse is reported
    /// as a missing task.
    pub task_id: String,
    /// Scope the task must belong to.
    pub scope: WorkspaceScope,
    /// New assignee.
    pub assignee_id: UserId,
    /// Version the caller last observed.
    pub expected_version: TaskVersion,
}

/// Outcome of a unit of work.
enum WriteOutcome {
    Applied(Task),
    Replayed(Task),
}

/// What the engine needs to look for a winning write after its own
/// transaction rolled back.
struct RaceRetry {
    scope: WorkspaceScope,
    action: IdempotencyAction,
    key: Option<IdempotencyKey>,
}

impl From<&WriteContext> for RaceRetry {
    fn from(context: &WriteContext) -> Self {
        Self {
            scope: context.scope.clone(),
            action: context.action,
            key: context.key.clone(),
        }
    }
}

/// Idempotency bookkeeping shared by every keyed write.
struct WriteContext {
    scope: WorkspaceScope,
    action: IdempotencyAction,
    key: Option<IdempotencyKey>,
    fingerprint: RequestFingerprint,
    now: DateTime<Utc>,
}

impl WriteContext {
    fn replay(&self, unit: &mut dyn UnitOfWork) -> TaskWorkflowResult<Option<Task>> {
        let Some(key) = self.key.as_ref() else {
            return Ok(None);
        };
        let Some(record) = unit.find_idempotency_record(&self.scope, self.action, key)? else {
            return Ok(None);
        };
        if record.request_fingerprint != self.fingerprint {
            warn!(
                scope = %self.scope,
                action = %self.action,
                key = %key,
                "idempotency key reused with a different request; replaying stored outcome"
            );
        }
        Ok(Some(Task::from_snapshot(record.response_snapshot)?))
    }

    fn record(
        self,
        unit: &mut dyn UnitOfWork,
        task: &Task,
        event_type: TaskEventType,
    ) -> TaskWorkflowResult<()> {
        unit.append_event(&NewTaskEvent::for_task(task, event_type)?)?;
        if let Some(key) = self.key {
            let record =
                NewIdempotencyRecord::for_task(self.action, key, task, self.fingerprint, self.now)?;
            unit.insert_idempotency_record(&record)?;
        }
        Ok(())
    }
}

/// Runs task writes as atomic units of work.
pub struct TaskWorkflowEngine<X, C>
where
    X: TransactionExecutor,
    C: Clock + Send + Sync,
{
    executor: Arc<X>,
    clock: Arc<C>,
}

impl<X, C> Clone for TaskWorkflowEngine<X, C>
where
    X: TransactionExecutor,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<X, C> TaskWorkflowEngine<X, C>
where
    X: TransactionExecutor,
    C: Clock + Send + Sync,
{
    /// Creates an engine over `executor`, stamping idempotency expiry with
    /// `clock`.
    #[must_use]
    pub const fn new(executor: Arc<X>, clock: Arc<C>) -> Self {
        Self { executor, clock }
    }

    /// Inserts a task, or replays the task created earlier under the same
    /// idempotency key.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError`] when a store or the transaction fails.
    /// Nothing is persisted in that case.
    #[tracing::instrument(name = "task.create", skip_all, fields(scope = %new_task.scope))]
    pub async fn create(
        &self,
        new_task: NewTask,
        idempotency_key: Option<IdempotencyKey>,
    ) -> TaskWorkflowResult<Task> {
        let context = WriteContext {
            scope: new_task.scope.clone(),
            action: IdempotencyAction::TaskCreate,
            key: idempotency_key,
            fingerprint: RequestFingerprint::of(&new_task)?,
            now: self.clock.utc(),
        };
        let retry = RaceRetry::from(&context);

        let result = self
            .executor
            .transaction(move |unit| -> TaskWorkflowResult<WriteOutcome> {
                if let Some(task) = context.replay(unit)? {
                    return Ok(WriteOutcome::Replayed(task));
                }
                let task = unit.insert_task(&new_task)?;
                context.record(unit, &task, TaskEventType::TaskCreated)?;
                Ok(WriteOutcome::Applied(task))
            })
            .await;

        self.settle(retry, result).await
    }

    /// Assigns a task under optimistic concurrency, or replays the outcome
    /// recorded earlier under the same idempotency key.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::NotFound`] when the task is absent from
    /// the scope, [`TaskWorkflowError::Validation`] when its state does not
    /// accept an assignee, [`TaskWorkflowError::Conflict`] when the version
    /// check fails, and other variants for store or transaction failures.
    /// Nothing is persisted on error.
    #[tracing::instrument(
        name = "task.assign",
        skip_all,
        fields(scope = %input.scope, task_id = %input.task_id)
    )]
    pub async fn assign(
        &self,
        input: AssignTaskInput,
        idempotency_key: Option<IdempotencyKey>,
    ) -> TaskWorkflowResult<Task> {
        let context = WriteContext {
            scope: input.scope.clone(),
            action: IdempotencyAction::TaskAssign,
            key: idempotency_key,
            fingerprint: RequestFingerprint::of(&input)?,
            now: self.clock.utc(),
        };
        let retry = RaceRetry::from(&context);

        let result = self
            .executor
            .transaction(move |unit| -> TaskWorkflowResult<WriteOutcome> {
                if let Some(task) = context.replay(unit)? {
                    return Ok(WriteOutcome::Replayed(task));
                }
                let task = apply_assignment(unit, input)?;
                context.record(unit, &task, TaskEventType::TaskAssigned)?;
                Ok(WriteOutcome::Applied(task))
            })
            .await;

        self.settle(retry, result).await
    }

    async fn settle(
        &self,
        retry: RaceRetry,
        result: TaskWorkflowResult<WriteOutcome>,
    ) -> TaskWorkflowResult<Task> {
        match result {
            Ok(WriteOutcome::Applied(task)) => {
                info!(task_id = %task.id(), version = %task.version(), "task write committed");
                Ok(task)
            }
            Ok(WriteOutcome::Replayed(task)) => {
                info!(task_id = %task.id(), "replayed idempotent task write");
                Ok(task)
            }
            Err(TaskWorkflowError::IdempotencyStore(IdempotencyStoreError::DuplicateKey {
                action,
                key,
            })) => match self.find_winner(retry.scope, action, key.clone()).await? {
                Some(winner) => Ok(winner),
                None => Err(IdempotencyStoreError::DuplicateKey { action, key }.into()),
            },
            Err(err @ TaskWorkflowError::Conflict { .. }) => {
                let RaceRetry {
                    scope,
                    action,
                    key: Some(key),
                } = retry
                else {
                    debug!(error = %err, "task write rejected by version check");
                    return Err(err);
                };
                match self.find_winner(scope, action, key).await? {
                    Some(winner) => Ok(winner),
                    None => {
                        debug!(error = %err, "task write rejected by version check");
                        Err(err)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Looks up the outcome a concurrent request recorded under `key`.
    async fn find_winner(
        &self,
        scope: WorkspaceScope,
        action: IdempotencyAction,
        key: IdempotencyKey,
    ) -> TaskWorkflowResult<Option<Task>> {
        let lookup_key = key.clone();
        let record = self
            .executor
            .transaction(move |unit| {
                unit.find_idempotency_record(&scope, action, &lookup_key)
                    .map_err(TaskWorkflowError::from)
            })
            .await?;

        let Some(winner) = record else {
            return Ok(None);
        };
        info!(%action, %key, "lost idempotency race; replaying winning write");
        Ok(Some(Task::from_snapshot(winner.response_snapshot)?))
    }
}

fn apply_assignment(unit: &mut dyn UnitOfWork, input: AssignTaskInput) -> TaskWorkflowResult<Task> {
    let AssignTaskInput {
        task_id: raw_task_id,
        scope,
        assignee_id,
        expected_version,
    } = input;

    let task_id =
        TaskId::parse(&raw_task_id).ok_or_else(|| TaskWorkflowError::task_not_found(&raw_task_id))?;
    let current = unit
        .find_task(task_id, &scope)?
        .ok_or_else(|| TaskWorkflowError::task_not_found(&raw_task_id))?;
    if !current.state().accepts_assignment() {
        return Err(TaskWorkflowError::validation(
            "state",
            format!(
                "task in state {} cannot be assigned",
                current.state().as_str()
            ),
        ));
    }

    let assignment = TaskAssignment {
        task_id,
        scope,
        assignee_id,
        expected_version,
    };
    unit.assign_task(&assignment).map_err(|err| match err {
        TaskStoreError::VersionMismatchOrMissing {
            expected_version: expected,
            ..
        } => TaskWorkflowError::Conflict {
            expected_version: expected,
            actual_version: current.version(),
        },
        other => other.into(),
    })
}
