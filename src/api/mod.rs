//! HTTP request adapter for the task workflow.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/health` | [`handlers::health`] |
//! | POST | `/v1/workspaces/{workspace_id}/tasks` | [`handlers::create_task`] |
//! | POST | `/v1/workspaces/{workspace_id}/tasks/{task_id}/assign` | [`handlers::assign_task`] |
//!
//! This is the only layer that turns workflow errors into status codes.

pub mod error;
pub mod handlers;
mod routes;

pub use error::{ApiErrorBody, ApiErrorResponse};
pub use routes::router;
