//! When steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use rstest_bdd_macros::when;
use tasklane::tenancy::UserRole;
use tasklane::workflow::services::CreateTaskRequest;

#[when(r#"a manager creates a task titled "{title}" with key "{key}""#)]
fn manager_creates_keyed_task(world: &mut TaskWorkflowWorld, title: String, key: String) {
    let request = CreateTaskRequest::new(
        world.tenant_id.clone(),
        world.workspace_id.clone(),
        title,
        UserRole::Manager,
    )
    .with_idempotency_key(key);
    let result = run_async(world.service.create_task(request)).map(|output| output.task);
    world.results.push(result);
}

#[when(r#"a manager assigns the task to "{assignee}" expecting version {version:u32}"#)]
fn manager_assigns(
    world: &mut TaskWorkflowWorld,
    assignee: String,
    version: u32,
) -> Result<(), eyre::Report> {
    assign_as(world, assignee, version, UserRole::Manager)
}

#[when(r#"an agent assigns the task to "{assignee}" expecting version {version:u32}"#)]
fn agent_assigns(
    world: &mut TaskWorkflowWorld,
    assignee: String,
    version: u32,
) -> Result<(), eyre::Report> {
    assign_as(world, assignee, version, UserRole::Agent)
}

fn assign_as(
    world: &mut TaskWorkflowWorld,
    assignee: String,
    version: u32,
    role: UserRole,
) -> Result<(), eyre::Report> {
    let request = world.assign_request(assignee, version, role)?;
    let result = run_async(world.service.assign_task(request)).map(|output| output.task);
    if let Ok(ref updated) = result {
        world.current_task = Some(updated.clone());
    }
    world.results.push(result);
    Ok(())
}
