//! End-to-end workflow behaviour against `PostgreSQL`.

use crate::postgres::helpers::{PgContext, pg_context, test_runtime};
use rstest::rstest;
use std::sync::Arc;
use tasklane::task::domain::{TaskPriority, TaskState};
use tasklane::tenancy::UserRole;
use tasklane::workflow::services::{AssignTaskRequest, TaskWorkflowError};

fn assign_request(context: &PgContext, task_id: String, assignee: &str) -> AssignTaskRequest {
    AssignTaskRequest::new(
        context.tenant_id.clone(),
        "ws",
        task_id,
        assignee,
        UserRole::Manager,
    )
    .with_expected_version(1)
}

#[rstest]
fn create_stores_task_event_and_key(pg_context: eyre::Result<PgContext>) -> eyre::Result<()> {
    let context = pg_context?;
    test_runtime()?.block_on(async {
        let output = context
            .service
            .create_task(context.create_request("Persisted").with_idempotency_key("k-1"))
            .await?;

        eyre::ensure!(output.task.version().value() == 1, "initial version");
        eyre::ensure!(output.task.state() == TaskState::New, "initial state");
        eyre::ensure!(
            output.task.priority() == TaskPriority::Medium,
            "default priority"
        );
        eyre::ensure!(context.count_rows("tasks")? == 1, "one task row");
        eyre::ensure!(context.count_rows("task_events")? == 1, "one event row");
        eyre::ensure!(context.count_rows("idempotency_keys")? == 1, "one key row");
        Ok(())
    })
}

#[rstest]
fn keyed_create_replays_from_the_database(
    pg_context: eyre::Result<PgContext>,
) -> eyre::Result<()> {
    let context = pg_context?;
    test_runtime()?.block_on(async {
        let first = context
            .service
            .create_task(context.create_request("Once").with_idempotency_key("k-1"))
            .await?;
        let second = context
            .service
            .create_task(context.create_request("Once").with_idempotency_key("k-1"))
            .await?;

        eyre::ensure!(first == second, "replay must return the stored task");
        eyre::ensure!(context.count_rows("tasks")? == 1, "one task row");
        Ok(())
    })
}

#[rstest]
fn assign_bumps_version_and_rejects_stale_writes(
    pg_context: eyre::Result<PgContext>,
) -> eyre::Result<()> {
    let context = pg_context?;
    test_runtime()?.block_on(async {
        let created = context
            .service
            .create_task(context.create_request("Assign me"))
            .await?
            .task;

        let assigned = context
            .service
            .assign_task(assign_request(&context, created.id().to_string(), "alice"))
            .await?
            .task;
        let stale = context
            .service
            .assign_task(assign_request(&context, created.id().to_string(), "bob"))
            .await;

        eyre::ensure!(assigned.version().value() == 2, "version bumped");
        eyre::ensure!(
            assigned.updated_at() >= created.updated_at(),
            "updated_at moves"
        );
        eyre::ensure!(
            matches!(
                &stale,
                Err(TaskWorkflowError::Conflict { expected_version, actual_version })
                    if expected_version.value() == 1 && actual_version.value() == 2
            ),
            "got {stale:?}"
        );
        eyre::ensure!(
            context.count_rows("task_events")? == 2,
            "no event for the loser"
        );
        Ok(())
    })
}

#[rstest]
fn racing_assigns_have_one_winner(pg_context: eyre::Result<PgContext>) -> eyre::Result<()> {
    let context = pg_context?;
    test_runtime()?.block_on(async {
        let created = context
            .service
            .create_task(context.create_request("Contended"))
            .await?
            .task;
        let service = Arc::new(context.service.clone());

        let attempts = (0..4).map(|n| {
            let racer = Arc::clone(&service);
            let request =
                assign_request(&context, created.id().to_string(), &format!("user-{n}"));
            tokio::spawn(async move { racer.assign_task(request).await })
        });
        let results = futures::future::join_all(attempts).await;

        let mut winners = 0;
        for joined in results {
            match joined? {
                Ok(_) => winners += 1,
                Err(TaskWorkflowError::Conflict { .. }) => {}
                Err(other) => return Err(other.into()),
            }
        }
        eyre::ensure!(winners == 1, "expected one winner, got {winners}");
        eyre::ensure!(
            context.count_rows("task_events")? == 2,
            "create plus one assign"
        );
        Ok(())
    })
}

#[rstest]
fn racing_keyed_assigns_all_see_the_winner(
    pg_context: eyre::Result<PgContext>,
) -> eyre::Result<()> {
    let context = pg_context?;
    test_runtime()?.block_on(async {
        let created = context
            .service
            .create_task(context.create_request("Contended"))
            .await?
            .task;
        let service = Arc::new(context.service.clone());

        let attempts = (0..4).map(|n| {
            let racer = Arc::clone(&service);
            let request =
                assign_request(&context, created.id().to_string(), &format!("user-{n}"))
                    .with_idempotency_key("assign-race");
            tokio::spawn(async move { racer.assign_task(request).await })
        });
        let results = futures::future::join_all(attempts).await;

        let mut outcomes = Vec::new();
        for joined in results {
            outcomes.push(joined??.task);
        }
        outcomes.dedup();
        eyre::ensure!(
            outcomes.len() == 1,
            "every racer must see the winning assignment: {outcomes:?}"
        );
        eyre::ensure!(
            context.count_rows("task_events")? == 2,
            "create plus one assign"
        );
        eyre::ensure!(context.count_rows("idempotency_keys")? == 1, "one key row");
        Ok(())
    })
}

#[rstest]
fn racing_keyed_creates_share_one_task(pg_context: eyre::Result<PgContext>) -> eyre::Result<()> {
    let context = pg_context?;
    test_runtime()?.block_on(async {
        let service = Arc::new(context.service.clone());

        let attempts = (0..4).map(|_| {
            let racer = Arc::clone(&service);
            let request = context
                .create_request("Raced")
                .with_idempotency_key("race");
            tokio::spawn(async move { racer.create_task(request).await })
        });
        let results = futures::future::join_all(attempts).await;

        let mut ids = Vec::new();
        for joined in results {
            ids.push(joined??.task.id());
        }
        ids.dedup();
        eyre::ensure!(ids.len() == 1, "every racer must see the same task: {ids:?}");
        eyre::ensure!(context.count_rows("tasks")? == 1, "one task row");
        eyre::ensure!(context.count_rows("idempotency_keys")? == 1, "one key row");
        Ok(())
    })
}
