//! Given steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use tasklane::tenancy::UserRole;
use tasklane::workflow::services::CreateTaskRequest;

#[given(r#"a task service for tenant "{tenant}" in workspace "{workspace}""#)]
fn task_service(world: &mut TaskWorkflowWorld, tenant: String, workspace: String) {
    world.tenant_id = tenant;
    world.workspace_id = workspace;
}

#[given(r#"an existing task titled "{title}""#)]
fn existing_task(world: &mut TaskWorkflowWorld, title: String) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(
        world.tenant_id.clone(),
        world.workspace_id.clone(),
        title,
        UserRole::Manager,
    );
    let output = run_async(world.service.create_task(request))
        .wrap_err("create task for scenario setup")?;
    world.current_task = Some(output.task);
    Ok(())
}

#[given(r#"the task was assigned to "{assignee}" at version {version:u32}"#)]
fn task_was_assigned(
    world: &mut TaskWorkflowWorld,
    assignee: String,
    version: u32,
) -> Result<(), eyre::Report> {
    let request = world.assign_request(assignee, version, UserRole::Manager)?;
    let output = run_async(world.service.assign_task(request))
        .wrap_err("assign task for scenario setup")?;
    world.current_task = Some(output.task);
    Ok(())
}
