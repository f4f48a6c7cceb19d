//! Outbox events and idempotency records written per request.

use crate::in_memory::helpers::{Harness, harness};
use rstest::rstest;
use tasklane::idempotency::domain::{IdempotencyAction, ReferenceType};
use tasklane::task::domain::{Task, TaskEventType};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_mutation_appends_one_event_with_its_snapshot(harness: Harness) -> eyre::Result<()> {
    let created = harness.create("acme", "ops", "Audited", None).await?;
    let assigned = harness.assign(&created, "alice", 1, None).await?;

    let events = harness.database.events()?;
    let kinds: Vec<_> = events.iter().map(|event| event.event_type).collect();
    eyre::ensure!(
        kinds == [TaskEventType::TaskCreated, TaskEventType::TaskAssigned],
        "unexpected events: {kinds:?}"
    );
    let snapshots = events
        .into_iter()
        .map(|event| Task::from_snapshot(event.snapshot))
        .collect::<Result<Vec<_>, _>>()?;
    eyre::ensure!(snapshots == [created, assigned], "snapshots must match results");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_assign_appends_nothing(harness: Harness) -> eyre::Result<()> {
    let created = harness.create("acme", "ops", "Quiet", None).await?;

    let result = harness.assign(&created, "alice", 5, Some("stale")).await;

    eyre::ensure!(result.is_err(), "stale version must fail");
    eyre::ensure!(harness.database.events()?.len() == 1, "only the create event");
    eyre::ensure!(
        harness.database.idempotency_records()?.is_empty(),
        "failed writes record no key"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn keyed_create_records_a_replayable_outcome(harness: Harness) -> eyre::Result<()> {
    let created = harness.create("acme", "ops", "Keyed", Some("create-1")).await?;

    let records = harness.database.idempotency_records()?;
    let record = records
        .first()
        .ok_or_else(|| eyre::eyre!("expected one idempotency record"))?;
    eyre::ensure!(records.len() == 1, "exactly one record");
    eyre::ensure!(record.action == IdempotencyAction::TaskCreate, "action");
    eyre::ensure!(record.reference_type == ReferenceType::Task, "reference type");
    eyre::ensure!(record.reference_id == created.id().to_string(), "reference id");
    eyre::ensure!(record.key.as_str() == "create-1", "key");
    eyre::ensure!(
        Task::from_snapshot(record.response_snapshot.clone())? == created,
        "snapshot replays the created task"
    );
    eyre::ensure!(
        record.expired_at > record.created_at,
        "retention window lies in the future"
    );
    Ok(())
}
