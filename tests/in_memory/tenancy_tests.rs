//! Isolation between tenants and workspaces.

use crate::in_memory::helpers::{Harness, harness};
use rstest::rstest;
use tasklane::tenancy::UserRole;
use tasklane::workflow::services::{AssignTaskRequest, TaskWorkflowError};

#[rstest]
#[case("globex", "ops")]
#[case("acme", "finance")]
#[tokio::test(flavor = "multi_thread")]
async fn tasks_are_invisible_outside_their_scope(
    harness: Harness,
    #[case] tenant: &str,
    #[case] workspace: &str,
) -> eyre::Result<()> {
    let created = harness.create("acme", "ops", "Private", None).await?;
    let request = AssignTaskRequest::new(
        tenant,
        workspace,
        created.id().to_string(),
        "mallory",
        UserRole::Manager,
    )
    .with_expected_version(1);

    let result = harness.service.assign_task(request).await;

    eyre::ensure!(
        matches!(result, Err(TaskWorkflowError::NotFound { .. })),
        "got {result:?}"
    );
    let stored = harness
        .database
        .committed_task(&created.scope(), created.id())?
        .ok_or_else(|| eyre::eyre!("task should still exist"))?;
    eyre::ensure!(stored.assignee_id().is_none(), "task untouched");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn idempotency_keys_are_scoped_per_tenant(harness: Harness) -> eyre::Result<()> {
    let first = harness.create("acme", "ops", "Shared key", Some("k")).await?;
    let second = harness.create("globex", "ops", "Shared key", Some("k")).await?;

    eyre::ensure!(first.id() != second.id(), "tenants must not share replays");
    eyre::ensure!(harness.database.task_count()? == 2, "two tasks stored");
    Ok(())
}
