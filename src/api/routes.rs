//! Router assembly.

use super::handlers::{assign_task, create_task, health};
use crate::workflow::ports::TransactionExecutor;
use crate::workflow::services::TaskService;
use axum::Router;
use axum::routing::{get, post};
use mockable::Clock;
use std::sync::Arc;

/// Builds the router serving every task endpoint from `service`.
#[must_use]
pub fn router<X, C>(service: Arc<TaskService<X, C>>) -> Router
where
    X: TransactionExecutor + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route(
            "/v1/workspaces/{workspace_id}/tasks",
            post(create_task::<X, C>),
        )
        .route(
            "/v1/workspaces/{workspace_id}/tasks/{task_id}/assign",
            post(assign_task::<X, C>),
        )
        .with_state(service)
}
