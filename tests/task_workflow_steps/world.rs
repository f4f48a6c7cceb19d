//! Shared world state for task workflow BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tasklane::task::domain::Task;
use tasklane::tenancy::UserRole;
use tasklane::workflow::adapters::memory::InMemoryDatabase;
use tasklane::workflow::services::{AssignTaskRequest, TaskService, TaskWorkflowResult};

/// Service type used by the BDD world.
pub type TestTaskService = TaskService<InMemoryDatabase<DefaultClock>, DefaultClock>;

/// Scenario world for task workflow behaviour tests.
pub struct TaskWorkflowWorld {
    pub database: Arc<InMemoryDatabase<DefaultClock>>,
    pub service: TestTaskService,
    pub tenant_id: String,
    pub workspace_id: String,
    pub current_task: Option<Task>,
    pub results: Vec<TaskWorkflowResult<Task>>,
}

impl TaskWorkflowWorld {
    /// Creates a world over an empty in-memory database.
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(DefaultClock);
        let database = Arc::new(InMemoryDatabase::new(Arc::clone(&clock)));
        let service = TaskService::new(Arc::clone(&database), clock);

        Self {
            database,
            service,
            tenant_id: String::new(),
            workspace_id: String::new(),
            current_task: None,
            results: Vec::new(),
        }
    }

    /// Builds an assignment for the current task.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn assign_request(
        &self,
        assignee: String,
        version: u32,
        role: UserRole,
    ) -> Result<AssignTaskRequest, eyre::Report> {
        let task = self
            .current_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing current task in scenario world"))?;
        Ok(AssignTaskRequest::new(
            self.tenant_id.clone(),
            self.workspace_id.clone(),
            task.id().to_string(),
            assignee,
            role,
        )
        .with_expected_version(version))
    }

    /// Returns the most recent result.
    ///
    /// # Errors
    ///
    /// Returns an error when no request has been made.
    pub fn last_result(&self) -> Result<&TaskWorkflowResult<Task>, eyre::Report> {
        self.results
            .last()
            .ok_or_else(|| eyre::eyre!("missing request result in scenario world"))
    }
}

impl Default for TaskWorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskWorkflowWorld {
    TaskWorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
