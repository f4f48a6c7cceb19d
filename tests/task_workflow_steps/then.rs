//! Then steps for task workflow BDD scenarios.

use super::world::TaskWorkflowWorld;
use rstest_bdd_macros::then;
use tasklane::workflow::services::TaskWorkflowError;

#[then("both responses carry the same task")]
fn both_responses_match(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let [first, second] = world.results.as_slice() else {
        return Err(eyre::eyre!(
            "expected two results, found {}",
            world.results.len()
        ));
    };
    let first_task = first
        .as_ref()
        .map_err(|err| eyre::eyre!("first request failed: {err}"))?;
    let second_task = second
        .as_ref()
        .map_err(|err| eyre::eyre!("second request failed: {err}"))?;
    eyre::ensure!(first_task == second_task, "replay returned a different task");
    Ok(())
}

#[then("the workspace holds {count:usize} task")]
fn workspace_holds(world: &TaskWorkflowWorld, count: usize) -> Result<(), eyre::Report> {
    let stored = world.database.task_count()?;
    eyre::ensure!(stored == count, "expected {count} tasks, found {stored}");
    Ok(())
}

#[then("{count:usize} outbox event was recorded")]
fn one_event_recorded(world: &TaskWorkflowWorld, count: usize) -> Result<(), eyre::Report> {
    events_recorded(world, count)
}

#[then("{count:usize} outbox events were recorded")]
fn events_recorded(world: &TaskWorkflowWorld, count: usize) -> Result<(), eyre::Report> {
    let recorded = world.database.events()?.len();
    eyre::ensure!(
        recorded == count,
        "expected {count} events, found {recorded}"
    );
    Ok(())
}

#[then(r#"the task is assigned to "{assignee}" at version {version:u32}"#)]
fn task_is_assigned(
    world: &TaskWorkflowWorld,
    assignee: String,
    version: u32,
) -> Result<(), eyre::Report> {
    let task = world
        .last_result()?
        .as_ref()
        .map_err(|err| eyre::eyre!("assignment failed: {err}"))?;
    eyre::ensure!(
        task.assignee_id().map(|id| id.as_str()) == Some(assignee.as_str()),
        "unexpected assignee {:?}",
        task.assignee_id()
    );
    eyre::ensure!(
        task.version().value() == version,
        "expected version {version}, found {}",
        task.version()
    );
    Ok(())
}

#[then("the request fails with a conflict expecting {expected:u32} but finding {actual:u32}")]
fn request_conflicts(
    world: &TaskWorkflowWorld,
    expected: u32,
    actual: u32,
) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    let Err(TaskWorkflowError::Conflict {
        expected_version,
        actual_version,
    }) = result
    else {
        return Err(eyre::eyre!("expected a conflict, got {result:?}"));
    };
    eyre::ensure!(
        expected_version.value() == expected && actual_version.value() == actual,
        "conflict reported {expected_version}/{actual_version}"
    );
    Ok(())
}

#[then("the request is rejected as forbidden")]
fn request_forbidden(world: &TaskWorkflowWorld) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    if !matches!(result, Err(TaskWorkflowError::Authorization(_))) {
        return Err(eyre::eyre!("expected an authorization error, got {result:?}"));
    }
    Ok(())
}
