//! Transaction semantics of the `PostgreSQL` executor.

use crate::postgres::helpers::{PgContext, pg_context, test_runtime};
use rstest::rstest;
use tasklane::idempotency::domain::{
    IdempotencyAction, IdempotencyKey, NewIdempotencyRecord, RequestFingerprint,
};
use tasklane::idempotency::ports::IdempotencyStoreError;
use tasklane::task::domain::{NewTask, NewTaskEvent, TaskEventType, TaskPriority, TaskTitle};
use tasklane::tenancy::WorkspaceScope;
use tasklane::workflow::ports::{TransactionError, TransactionExecutor};
use tasklane::workflow::services::TaskWorkflowError;

fn new_task(context: &PgContext) -> eyre::Result<NewTask> {
    Ok(NewTask::new(
        WorkspaceScope::from_parts(context.tenant_id.clone(), "ws")?,
        TaskTitle::new("Transactional")?,
        TaskPriority::Low,
    ))
}

#[rstest]
fn failed_work_rolls_back(pg_context: eyre::Result<PgContext>) -> eyre::Result<()> {
    let context = pg_context?;
    let task = new_task(&context)?;
    let rt = test_runtime()?;

    let result = rt.block_on(context.executor.transaction(
        move |unit| -> Result<(), TaskWorkflowError> {
            let inserted = unit.insert_task(&task)?;
            unit.append_event(&NewTaskEvent::for_task(&inserted, TaskEventType::TaskCreated)?)?;
            Err(TaskWorkflowError::validation("title", "rejected after writing"))
        },
    ));

    eyre::ensure!(
        matches!(result, Err(TaskWorkflowError::Validation { .. })),
        "got {result:?}"
    );
    eyre::ensure!(context.count_rows("tasks")? == 0, "task rolled back");
    eyre::ensure!(context.count_rows("task_events")? == 0, "event rolled back");
    Ok(())
}

#[rstest]
fn scoped_lookup_misses_other_tenants(pg_context: eyre::Result<PgContext>) -> eyre::Result<()> {
    let context = pg_context?;
    let task = new_task(&context)?;
    let foreign = WorkspaceScope::from_parts("someone-else", "ws")?;
    let rt = test_runtime()?;

    let (own, other) = rt.block_on(context.executor.transaction(
        move |unit| -> Result<_, TaskWorkflowError> {
            let inserted = unit.insert_task(&task)?;
            let own = unit.find_task(inserted.id(), &task.scope)?;
            let other = unit.find_task(inserted.id(), &foreign)?;
            Ok((own, other))
        },
    ))?;

    eyre::ensure!(own.is_some(), "own scope sees the task");
    eyre::ensure!(other.is_none(), "foreign scope must miss");
    Ok(())
}

#[rstest]
fn duplicate_key_maps_to_duplicate_key_error(
    pg_context: eyre::Result<PgContext>,
) -> eyre::Result<()> {
    let context = pg_context?;
    let task = new_task(&context)?;
    let rt = test_runtime()?;

    let stored = rt.block_on(context.executor.transaction(
        move |unit| -> Result<_, TaskWorkflowError> { Ok(unit.insert_task(&task)?) },
    ))?;
    let record = NewIdempotencyRecord::for_task(
        IdempotencyAction::TaskCreate,
        IdempotencyKey::new("dup")?,
        &stored,
        RequestFingerprint::from_persisted("fingerprint".to_owned()),
        stored.created_at(),
    )?;
    let first = record.clone();
    rt.block_on(context.executor.transaction(
        move |unit| -> Result<_, TaskWorkflowError> {
            Ok(unit.insert_idempotency_record(&first)?)
        },
    ))?;

    let result = rt.block_on(context.executor.transaction(
        move |unit| -> Result<_, TaskWorkflowError> {
            Ok(unit.insert_idempotency_record(&record)?)
        },
    ));

    eyre::ensure!(
        matches!(
            &result,
            Err(TaskWorkflowError::IdempotencyStore(
                IdempotencyStoreError::DuplicateKey { action, key }
            )) if *action == IdempotencyAction::TaskCreate && key.as_str() == "dup"
        ),
        "got {result:?}"
    );
    eyre::ensure!(context.count_rows("idempotency_keys")? == 1, "one key row");
    Ok(())
}

#[rstest]
fn nested_transactions_are_rejected(pg_context: eyre::Result<PgContext>) -> eyre::Result<()> {
    let context = pg_context?;
    let inner = std::sync::Arc::clone(&context.executor);
    let rt = test_runtime()?;

    let result = rt.block_on(context.executor.transaction(move |_unit| {
        futures::executor::block_on(inner.transaction(|_unit| Ok::<_, TransactionError>(())))
    }));

    eyre::ensure!(
        matches!(result, Err(TransactionError::Nested)),
        "got {result:?}"
    );
    Ok(())
}
